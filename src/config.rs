//! Loading quiz configuration (prompt template, field groupings,
//! recommendation table, data paths) from TOML.
//!
//! See `QuizConfig` for the expected schema. Every section has built-in
//! defaults mirroring the original manifesto dataset, so the app runs with
//! no config file at all.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize)]
pub struct QuizConfig {
    #[serde(default)]
    pub prompts: Prompts,
    #[serde(default = "default_field_groupings")]
    pub fields: Vec<FieldGrouping>,
    #[serde(default = "default_recommendation_rules")]
    pub recommendations: Vec<RecommendationRule>,
    /// Shown for a low-scoring category that matches no rule keyword.
    /// `{category}` is substituted.
    #[serde(default = "default_fallback_recommendation")]
    pub fallback_recommendation: String,
    /// The single message emitted when every category scores >= 50%.
    #[serde(default = "default_congratulations")]
    pub congratulations: String,
    /// Path of the combined question CSV the server loads at startup.
    #[serde(default = "default_questions_path")]
    pub questions_path: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            prompts: Prompts::default(),
            fields: default_field_groupings(),
            recommendations: default_recommendation_rules(),
            fallback_recommendation: default_fallback_recommendation(),
            congratulations: default_congratulations(),
            questions_path: default_questions_path(),
        }
    }
}

/// A named bundle of categories presented to the user as one selectable
/// topic area. Categories come from source document names, so one field
/// usually aggregates a handful of them.
#[derive(Clone, Debug, Deserialize)]
pub struct FieldGrouping {
    pub name: String,
    pub categories: Vec<String>,
}

/// Ordered remedial-message table: the first rule whose keyword is a
/// substring of the category label wins.
#[derive(Clone, Debug, Deserialize)]
pub struct RecommendationRule {
    pub keyword: String,
    pub message: String,
}

/// Prompts used by the quiz generator. The default asks for 5-8 four-option
/// questions in the comma-separated row layout; override in TOML to tune
/// tone/structure. `{category}` and `{content}` are substituted.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
    pub generation_template: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            generation_template: r#"以下の日本語のマニフェスト文書を読んで、内容に基づいて4択クイズを5-8問作成してください。

文書内容:
{content}

要件:
1. 4択クイズの形式で出力してください
2. 各問題は文書の重要な内容を扱うこと
3. 選択肢は1つが正解、3つが不正解になるように作成
4. 正解番号は1-4の数字で指定
5. 各問題に簡潔な解説を付ける
6. カテゴリ名は「{category}」を使用

出力形式（CSVの行として）:
category,question,option1,option2,option3,option4,correct_answer,explanation

例:
{category},この政策の目標は何ですか？,デジタル化を進める,格差を解消する,経済成長を促進する,教育を改善する,1,この政策はデジタル化を通じて社会課題の解決を目指しています。

実際のクイズ問題を作成してください（ヘッダー行は不要）:
"#
            .into(),
        }
    }
}

fn default_field_groupings() -> Vec<FieldGrouping> {
    let fields: &[(&str, &[&str])] = &[
        ("ビジョン・基本方針", &["チームみらいのビジョン", "ビジョン・基本方針"]),
        ("教育", &["教育政策", "ステップ１教育"]),
        ("行政改革", &["行政改革", "ステップ１行政改革"]),
        ("子育て", &["子育て支援"]),
        ("医療", &["医療政策"]),
        ("科学技術", &["科学技術", "ステップ１科学技術"]),
        ("経済財政", &["経済財政", "産業政策"]),
    ];
    fields
        .iter()
        .map(|(name, cats)| FieldGrouping {
            name: (*name).into(),
            categories: cats.iter().map(|c| (*c).into()).collect(),
        })
        .collect()
}

fn default_recommendation_rules() -> Vec<RecommendationRule> {
    let rules: &[(&str, &str)] = &[
        (
            "教育",
            "📚 教育政策についてもっと詳しく学んでみましょう。AIを活用した個別最適化教育に注目です！",
        ),
        (
            "行政",
            "🏛️ 行政改革について学習を深めませんか？デジタル化による効率的な行政サービスがポイントです。",
        ),
        (
            "子育て",
            "👶 子育て支援政策をもう一度チェックしてみましょう。デジタル母子パスポートなど革新的な取り組みがあります。",
        ),
        (
            "医療",
            "🏥 医療政策について復習してみてください。オンライン診療など新しい医療のあり方に注目です。",
        ),
        (
            "ビジョン",
            "🎯 チームみらいの基本的なビジョンをもう一度確認してみましょう。",
        ),
    ];
    rules
        .iter()
        .map(|(keyword, message)| RecommendationRule {
            keyword: (*keyword).into(),
            message: (*message).into(),
        })
        .collect()
}

fn default_fallback_recommendation() -> String {
    "🔁 「{category}」の分野をもう一度読み直してみましょう。".into()
}

fn default_congratulations() -> String {
    "🎉 素晴らしい！全分野で高いスコアを獲得しました。チームみらいの政策をよく理解されています！".into()
}

fn default_questions_path() -> String {
    "quiz_all_combined.csv".into()
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO
/// error, returns None and the caller falls back to defaults.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
    let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
    match std::fs::read_to_string(&path) {
        Ok(s) => match toml::from_str::<QuizConfig>(&s) {
            Ok(cfg) => {
                info!(target: "quiz", %path, "Loaded quiz config (TOML)");
                Some(cfg)
            }
            Err(e) => {
                error!(target: "quiz", %path, error = %e, "Failed to parse TOML config");
                None
            }
        },
        Err(e) => {
            error!(target: "quiz", %path, error = %e, "Failed to read TOML config file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_usable() {
        let cfg = QuizConfig::default();
        assert!(!cfg.fields.is_empty());
        assert!(!cfg.recommendations.is_empty());
        assert!(cfg.prompts.generation_template.contains("{content}"));
        assert!(cfg.prompts.generation_template.contains("{category}"));
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_sections() {
        let cfg: QuizConfig = toml::from_str(
            r#"
            questions_path = "other.csv"

            [[fields]]
            name = "テスト"
            categories = ["カテゴリA", "カテゴリB"]
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.questions_path, "other.csv");
        assert_eq!(cfg.fields.len(), 1);
        assert_eq!(cfg.fields[0].categories.len(), 2);
        assert!(!cfg.recommendations.is_empty());
    }
}
