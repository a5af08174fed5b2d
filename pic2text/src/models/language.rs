use serde::{Deserialize, Serialize};

/// Target language for translation and speech.
///
/// The canonical codes are the two-letter ones (`en`, `hi`, ...). The
/// three-letter forms (`eng`, `hin`, ...) are accepted on input and
/// normalized, so callers never have to care which selector produced them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Tamil,
    Telugu,
    Kannada,
    Marathi,
}

/// Fallback locale for speech when a code has no entry in the table.
pub const DEFAULT_SPEECH_LOCALE: &str = "en-US";

impl Language {
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Hindi,
        Language::Tamil,
        Language::Telugu,
        Language::Kannada,
        Language::Marathi,
    ];

    /// Canonical two-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Tamil => "ta",
            Self::Telugu => "te",
            Self::Kannada => "kn",
            Self::Marathi => "mr",
        }
    }

    /// Value sent in the `lang` field of an extraction request.
    pub fn service_code(&self) -> &'static str {
        self.code()
    }

    pub fn speech_locale(&self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Hindi => "hi-IN",
            Self::Tamil => "ta-IN",
            Self::Telugu => "te-IN",
            Self::Kannada => "kn-IN",
            Self::Marathi => "mr-IN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Kannada => "Kannada",
            Self::Marathi => "Marathi",
        }
    }
}

/// Locale used for speech for an arbitrary language code; unknown codes
/// get [`DEFAULT_SPEECH_LOCALE`].
pub fn speech_locale_for(code: &str) -> &'static str {
    code.parse::<Language>()
        .map(|lang| lang.speech_locale())
        .unwrap_or(DEFAULT_SPEECH_LOCALE)
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "eng" => Ok(Self::English),
            "hi" | "hin" => Ok(Self::Hindi),
            "ta" | "tam" => Ok(Self::Tamil),
            "te" | "tel" => Ok(Self::Telugu),
            "kn" | "kan" => Ok(Self::Kannada),
            "mr" | "mar" => Ok(Self::Marathi),
            _ => {
                let known: Vec<&str> = Self::ALL.iter().map(Language::code).collect();
                Err(format!(
                    "Unsupported language code: {s} (expected one of {})",
                    known.join(", ")
                ))
            }
        }
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for &'static str {
    fn from(lang: Language) -> Self {
        lang.code()
    }
}
