//! Fixed bilingual interface texts.

use crate::message::Language;

/// Assistant-style reply shown for every failed completion.
pub fn error_reply(language: Language) -> &'static str {
    match language {
        Language::Arabic => "عذراً، حدث خطأ. يرجى المحاولة مرة أخرى لاحقاً.",
        Language::English => "I apologize, but I encountered an error. Please try again later.",
    }
}

pub fn loading(language: Language) -> &'static str {
    match language {
        Language::Arabic => "اذكر الله إلى أن يتم إنشاء الفتوى",
        Language::English => "Remember Allah while the fatwa is being generated",
    }
}

pub fn welcome_title(language: Language) -> &'static str {
    match language {
        Language::Arabic => "مرحباً بك في الفتوى الذكية!",
        Language::English => "Welcome to Fatwa AI!",
    }
}

pub fn welcome_body(language: Language) -> &'static str {
    match language {
        Language::Arabic => {
            "اسأل أسئلتك حول الأحكام الإسلامية واحصل على إجابات مبنية على القرآن والحديث."
        }
        Language::English => {
            "Ask your questions about Islamic rulings and get answers based on the Quran and Hadith."
        }
    }
}

pub fn features_heading(language: Language) -> &'static str {
    match language {
        Language::Arabic => "مميزات الفتوى الذكية:",
        Language::English => "Fatwa AI Features:",
    }
}

pub fn features(language: Language) -> [&'static str; 4] {
    match language {
        Language::Arabic => [
            "إجابات فورية مبنية على القرآن والسنة",
            "دعم اللغتين العربية والإنجليزية",
            "واجهة سهلة الاستخدام",
            "تحليل شامل للمسائل الفقهية",
        ],
        Language::English => [
            "Instant answers based on Quran and Sunnah",
            "Bilingual support (Arabic & English)",
            "User-friendly interface",
            "Comprehensive analysis of Islamic jurisprudence",
        ],
    }
}

pub fn disclaimer(language: Language) -> &'static str {
    match language {
        Language::Arabic => {
            "يرجى ملاحظة أن الذكاء الاصطناعي قد يخطئ. تحقق دائمًا من الإجابات مع مصادر موثوقة."
        }
        Language::English => {
            "Please note that AI can make mistakes. Always verify answers with trusted sources."
        }
    }
}

pub fn you(language: Language) -> &'static str {
    match language {
        Language::Arabic => "أنت",
        Language::English => "You",
    }
}

pub fn assistant(language: Language) -> &'static str {
    match language {
        Language::Arabic => "المفتي",
        Language::English => "Mufti",
    }
}

pub fn busy(language: Language) -> &'static str {
    match language {
        Language::Arabic => "يرجى الانتظار حتى تكتمل الإجابة الحالية.",
        Language::English => "Please wait for the current answer to finish.",
    }
}

pub fn cleared(language: Language) -> &'static str {
    match language {
        Language::Arabic => "تم مسح المحادثة.",
        Language::English => "Conversation cleared.",
    }
}

/// Appended to a reply when it is copied out of the session.
pub fn attribution(language: Language) -> &'static str {
    match language {
        Language::Arabic => "إرشاد من إرشاد - irshadai.vercel.app",
        Language::English => "Guidance by IrshadAI - irshadai.vercel.app",
    }
}

pub fn copied(language: Language) -> &'static str {
    match language {
        Language::Arabic => "تم نسخ الإجابة.",
        Language::English => "Answer copied to clipboard.",
    }
}

pub fn nothing_to_copy(language: Language) -> &'static str {
    match language {
        Language::Arabic => "لا توجد إجابة لنسخها بعد.",
        Language::English => "There is no answer to copy yet.",
    }
}

pub fn name_prompt(language: Language) -> &'static str {
    match language {
        Language::Arabic => "الاسم: ",
        Language::English => "Name: ",
    }
}

pub fn gender_prompt(language: Language) -> &'static str {
    match language {
        Language::Arabic => "الجنس (ذكر/أنثى، m/f): ",
        Language::English => "Gender (male/female, m/f): ",
    }
}

pub fn avatar_prompt(language: Language) -> &'static str {
    match language {
        Language::Arabic => "مسار الصورة الشخصية (اختياري، اضغط Enter للتخطي): ",
        Language::English => "Avatar image path (optional, press Enter to skip): ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_text_is_translated() {
        for lang in [Language::Arabic, Language::English] {
            assert!(!error_reply(lang).is_empty());
            assert!(!loading(lang).is_empty());
            assert!(features(lang).iter().all(|f| !f.is_empty()));
        }
        assert_ne!(error_reply(Language::Arabic), error_reply(Language::English));
    }
}
