//! 内置改写器 - 业务能力层
//!
//! 一个简单的确定性改写实现：缩写替换、书面词简化、空白整理。
//! 批量编排并不依赖它，任何 `TextTransform` 实现都可以替换它。

use crate::models::TransformMode;
use crate::services::transform::{TextTransform, TransformOutput};
use anyhow::{bail, Result};
use phf::phf_map;
use regex::{Captures, Regex};
use serde_json::json;

/// 常见缩写
static CONTRACTIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "do not" => "don't",
    "does not" => "doesn't",
    "did not" => "didn't",
    "is not" => "isn't",
    "are not" => "aren't",
    "was not" => "wasn't",
    "were not" => "weren't",
    "can not" => "can't",
    "cannot" => "can't",
    "will not" => "won't",
    "would not" => "wouldn't",
    "should not" => "shouldn't",
    "could not" => "couldn't",
    "it is" => "it's",
    "that is" => "that's",
    "there is" => "there's",
    "i am" => "I'm",
    "we are" => "we're",
    "they are" => "they're",
    "you are" => "you're",
    "it will" => "it'll",
    "we will" => "we'll",
};

/// 书面词 -> 口语词，只在 balanced / aggressive 模式下使用
static SIMPLIFICATIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "utilize" => "use",
    "utilizes" => "uses",
    "in order to" => "to",
    "commence" => "start",
    "numerous" => "many",
    "approximately" => "about",
    "furthermore" => "also",
    "additionally" => "also",
    "subsequently" => "later",
    "demonstrate" => "show",
    "purchase" => "buy",
    "assist" => "help",
};

/// 简化规则的最低强度
const SIMPLIFY_MIN_INTENSITY: f64 = 0.7;

/// 缩写 / 简化改写器
pub struct ContractionRewriter {
    contraction_re: Regex,
    simplification_re: Regex,
    whitespace_re: Regex,
}

impl ContractionRewriter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            contraction_re: build_phrase_regex(&CONTRACTIONS)?,
            simplification_re: build_phrase_regex(&SIMPLIFICATIONS)?,
            whitespace_re: Regex::new(r"\s+")?,
        })
    }
}

impl TextTransform for ContractionRewriter {
    fn name(&self) -> &str {
        "contraction_rewriter"
    }

    fn transform(&self, text: &str, mode: TransformMode) -> Result<TransformOutput> {
        if text.trim().is_empty() {
            bail!("文本为空");
        }

        let cleaned = self.whitespace_re.replace_all(text.trim(), " ").into_owned();
        let whitespace_changed = cleaned != text;

        let (contracted, contraction_count) =
            replace_phrases(&self.contraction_re, &CONTRACTIONS, &cleaned);

        let mut output_text = contracted;
        let simplification_detail = if mode.intensity() >= SIMPLIFY_MIN_INTENSITY {
            let (simplified, count) =
                replace_phrases(&self.simplification_re, &SIMPLIFICATIONS, &output_text);
            output_text = simplified;
            json!({ "applied": count > 0, "count": count })
        } else {
            json!({ "applied": false, "skipped": format!("模式 {} 不启用", mode) })
        };

        Ok(TransformOutput::new(output_text)
            .with_detail(
                "contractions",
                json!({ "applied": contraction_count > 0, "count": contraction_count }),
            )
            .with_detail("simplifications", simplification_detail)
            .with_detail("whitespace_cleanup", json!({ "applied": whitespace_changed })))
    }
}

/// 由词表构建整词匹配的正则（长短语优先）
fn build_phrase_regex(table: &phf::Map<&'static str, &'static str>) -> Result<Regex> {
    let mut phrases: Vec<&str> = table.keys().copied().collect();
    phrases.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

    let alternation = phrases
        .iter()
        .map(|p| regex::escape(p).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");

    Ok(Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?)
}

/// 替换所有命中的短语，保留首字母大写，返回 (新文本, 替换次数)
fn replace_phrases(
    re: &Regex,
    table: &phf::Map<&'static str, &'static str>,
    text: &str,
) -> (String, usize) {
    let mut count = 0;
    let replaced = re.replace_all(text, |caps: &Captures| {
        let matched = &caps[0];
        let key = matched
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        match table.get(key.as_str()) {
            Some(replacement) => {
                count += 1;
                match_case(matched, replacement)
            }
            None => matched.to_string(),
        }
    });
    (replaced.into_owned(), count)
}

fn match_case(original: &str, replacement: &str) -> String {
    let starts_upper = original.chars().next().is_some_and(char::is_uppercase);
    if !starts_upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> ContractionRewriter {
        ContractionRewriter::new().expect("正则应该能编译")
    }

    #[test]
    fn test_contractions_keep_capitalisation() {
        let output = rewriter()
            .transform("Do not worry, it is fine.", TransformMode::Fast)
            .unwrap();
        assert_eq!(output.text, "Don't worry, it's fine.");
        assert_eq!(output.details["contractions"]["count"], 2);
        assert_eq!(output.details["contractions"]["applied"], true);
    }

    #[test]
    fn test_simplification_depends_on_mode() {
        let text = "We utilize numerous tools.";

        let fast = rewriter().transform(text, TransformMode::Fast).unwrap();
        assert_eq!(fast.text, text);
        assert_eq!(fast.details["simplifications"]["applied"], false);

        let aggressive = rewriter().transform(text, TransformMode::Aggressive).unwrap();
        assert_eq!(aggressive.text, "We use many tools.");
        assert_eq!(aggressive.details["simplifications"]["count"], 2);
    }

    #[test]
    fn test_whitespace_cleanup() {
        let output = rewriter()
            .transform("  The   cat\n sat. ", TransformMode::Balanced)
            .unwrap();
        assert_eq!(output.text, "The cat sat.");
        assert_eq!(output.details["whitespace_cleanup"]["applied"], true);
    }

    #[test]
    fn test_words_inside_other_words_untouched() {
        let output = rewriter()
            .transform("The assistant is notable.", TransformMode::Aggressive)
            .unwrap();
        assert_eq!(output.text, "The assistant is notable.");
    }

    #[test]
    fn test_blank_text_rejected() {
        assert!(rewriter().transform("   ", TransformMode::Fast).is_err());
    }
}
