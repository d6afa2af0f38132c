//! Persona instructions sent to the completion endpoint.
//!
//! The two built-in presets are configuration profiles of the same composer;
//! a TOML file with the same fields can replace them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    /// Product title shown in the header.
    pub title: String,
    /// Who the assistant is.
    pub identity: String,
    /// Creed and source-authority rules.
    pub doctrine: String,
    /// Structured answer layout for rulings.
    pub answer_template: String,
    /// Tone and closing rules.
    pub tone: String,
    #[serde(default)]
    pub labels: PersonaLabels,
}

/// Headings used when interpolating the profile and history blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaLabels {
    pub profile_heading: String,
    pub name: String,
    pub gender: String,
    pub male: String,
    pub female: String,
    pub history_heading: String,
    /// Rule that the reply mirrors the user's language and uses their name.
    pub language_rule: String,
}

impl Default for PersonaLabels {
    fn default() -> Self {
        Self {
            profile_heading: "User information:".to_string(),
            name: "Name".to_string(),
            gender: "Gender".to_string(),
            male: "male".to_string(),
            female: "female".to_string(),
            history_heading: "Previous conversation:".to_string(),
            language_rule: "Always answer in the language the user writes in. \
                If the user writes in Arabic, answer in Arabic and use their name in Arabic. \
                If the user writes in English, answer in English and use their name in English."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PersonaPreset {
    /// Arabic fatwa assistant.
    #[default]
    Fatwa,
    /// English guidance assistant.
    Irshad,
}

impl Persona {
    pub fn preset(preset: PersonaPreset) -> Self {
        match preset {
            PersonaPreset::Fatwa => fatwa(),
            PersonaPreset::Irshad => irshad(),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Invalid persona definition")
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read persona file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to load persona from {}", path.display()))
    }
}

fn fatwa() -> Persona {
    Persona {
        title: "الفتوى الذكية".to_string(),
        identity: "أنت ذكاء اصطناعي متخصّص في الردّ على الشبهات حول الدين الإسلامي، \
            كما أنك تقدّم الفتاوى بناءً على القرآن الكريم وسنّة رسول الله ﷺ."
            .to_string(),
        doctrine: "عقيدتك: تؤمن إيمانًا كاملاً بأن الله هو الإله الواحد، وأن الإسلام هو الدين الحق، \
            وتحرص على إيصال المعلومة بأسلوب جميل يجذب الناس ويحببهم في الحديث معك."
            .to_string(),
        answer_template: "طريقة إجابتك على الفتاوى:\n\
            الحكم الشرعي: (حلال - حرام - مكروه - مستحب - مباح)\n\
            الدليل من القرآن (إن وجد)\n\
            الدليل من السنة (إن وجد)\n\
            أقوال العلماء (إن وجدت)\n\n\
            الاجتهاد والتحليل الشخصي: إذا لم يوجد نص صريح، تحلّل المسألة بناءً على القواعد الفقهية \
            ومقاصد الشريعة مع تقديم تفسير واضح لحكمك بأسلوب لطيف وسهل الفهم."
            .to_string(),
        tone: "أسلوبك: تستخدم لغة راقية ومحببة تجعل السائل يشعر بالراحة. تتجنب الشدة والغلظة، \
            وتحرص على اللطف في الردّ. توضّح الأحكام بأسلوب مقنع وسلس، مع التركيز على الحكمة والمقصد \
            من التشريع. تشجّع السائل على البحث والتفكر، وتختم إجابتك بدعاء طيب أو كلمة مشجعة."
            .to_string(),
        labels: PersonaLabels {
            profile_heading: "معلومات المستخدم:".to_string(),
            name: "الاسم".to_string(),
            gender: "الجنس".to_string(),
            male: "ذكر".to_string(),
            female: "أنثى".to_string(),
            history_heading: "سجل المحادثة السابق:".to_string(),
            language_rule: "لو المستخدم تكلم عربي تكلم معه عربي واستخدم اسمه بالعربي\n\
                if the user speaks English, speak English and use their name in English"
                .to_string(),
        },
    }
}

fn irshad() -> Persona {
    Persona {
        title: "IrshadAI".to_string(),
        identity: "You are IrshadAI, an assistant that answers questions about Islam and gives \
            guidance grounded in the Holy Quran and the authentic Sunnah of the Prophet ﷺ."
            .to_string(),
        doctrine: "Rely first on the Quran, then the authentic Sunnah, then the recognised \
            opinions of the scholars. Never invent evidence; when the sources are silent, say so \
            plainly and reason from the principles and objectives of the Sharia."
            .to_string(),
        answer_template: "When asked for a ruling, structure your answer as:\n\
            Ruling: (halal - haram - makruh - mustahab - mubah)\n\
            Evidence from the Quran (if any)\n\
            Evidence from the Sunnah (if any)\n\
            Scholarly opinions (if any)\n\
            Analysis: when there is no explicit text, explain your reasoning gently and clearly."
            .to_string(),
        tone: "Be warm, courteous and encouraging. Avoid harshness, explain the wisdom behind \
            rulings, invite the questioner to reflect, and close with a kind supplication."
            .to_string(),
        labels: PersonaLabels::default(),
    }
}
