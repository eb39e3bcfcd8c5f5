use std::str::FromStr;

/// Language of every string drawn onto a collage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn labels(&self) -> &'static Labels {
        match self {
            Locale::En => &EN,
            Locale::Ru => &RU,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "ru" | "ru-ru" => Ok(Locale::Ru),
            other => Err(format!("Unsupported locale: {}", other)),
        }
    }
}

#[derive(Debug)]
pub struct Labels {
    pub title: &'static str,
    pub default_username: &'static str,
    pub captured: &'static str,
    pub uploaded: &'static str,
    pub no_metadata: &'static str,
    pub questionnaire: &'static str,
    pub bot_age: &'static str,
    pub real_age: &'static str,
    pub weight: &'static str,
    pub height: &'static str,
    pub gender: &'static str,
    pub skin_type: &'static str,
    pub procedures: &'static str,
    pub comment_before: &'static str,
    pub comment_after: &'static str,
    pub kg: &'static str,
    pub cm: &'static str,
}

pub static EN: Labels = Labels {
    title: "Photo diary",
    default_username: "User",
    captured: "Captured: ",
    uploaded: "Uploaded: ",
    no_metadata: "No capture metadata (likely a screenshot)",
    questionnaire: "Questionnaire:",
    bot_age: "Bot age",
    real_age: "Age",
    weight: "Weight",
    height: "Height",
    gender: "Gender",
    skin_type: "Skin type",
    procedures: "Procedures",
    comment_before: "Comment (before)",
    comment_after: "Comment (after)",
    kg: "kg",
    cm: "cm",
};

pub static RU: Labels = Labels {
    title: "Фотодневник",
    default_username: "Пользователь",
    captured: "Снято: ",
    uploaded: "Загружено: ",
    no_metadata: "Нет данных о съёмке (вероятно, скриншот)",
    questionnaire: "Анкета:",
    bot_age: "Возраст по боту",
    real_age: "Возраст",
    weight: "Вес",
    height: "Рост",
    gender: "Пол",
    skin_type: "Тип кожи",
    procedures: "Процедуры",
    comment_before: "Комментарий (до)",
    comment_after: "Комментарий (после)",
    kg: "кг",
    cm: "см",
};
