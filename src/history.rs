// ocr-translator/src/history.rs

// ============================================================================
// MÓDULO HISTORY - Tradução atual + histórico da sessão (só em memória)
// ============================================================================

use chrono::{DateTime, Local};

use crate::parser::ParsedResponse;

/// Texto exibido no campo "Original" quando o parse não achou nenhuma seção
pub const SEE_BELOW_PLACEHOLDER: &str = "See translation below";

/// Texto exibido no campo "Original" quando só a tradução foi encontrada
pub const UNREADABLE_PLACEHOLDER: &str = "Could not read text";

const SEPARATOR_WIDTH: usize = 50;

/// Resultado de um ciclo captura → tradução. Imutável depois de criado.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub source: String,
    pub translated: String,
    pub timestamp: DateTime<Local>,
}

impl TranslationResult {
    pub fn new(source: impl Into<String>, translated: impl Into<String>) -> Self {
        TranslationResult {
            source: source.into(),
            translated: translated.into(),
            timestamp: Local::now(),
        }
    }

    /// Monta o resultado a partir da resposta crua e do parse.
    ///
    /// Um parse sem nenhuma seção não é descartado: a resposta inteira vai
    /// para o campo de tradução, para o usuário ver o que o assistente disse.
    pub fn from_reply(raw: &str, parsed: ParsedResponse) -> Self {
        if parsed.is_empty() {
            return Self::new(SEE_BELOW_PLACEHOLDER, raw.trim());
        }

        let source = if parsed.source.is_empty() {
            UNREADABLE_PLACEHOLDER.to_string()
        } else {
            parsed.source
        };
        let translated = if parsed.translated.is_empty() {
            raw.trim().to_string()
        } else {
            parsed.translated
        };

        Self::new(source, translated)
    }

    /// Texto da entrada no log do histórico
    pub fn render(&self) -> String {
        format!(
            "[{}]\nOriginal: {}\nTranslation: {}\n{}",
            self.timestamp.format("%H:%M:%S"),
            self.source,
            self.translated,
            "─".repeat(SEPARATOR_WIDTH)
        )
    }
}

/// Tradução atual + log da sessão (mais recente primeiro)
#[derive(Debug, Default)]
pub struct History {
    current: Option<TranslationResult>,
    entries: Vec<TranslationResult>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atualiza a tradução atual e adiciona uma entrada no topo do log
    pub fn record(&mut self, result: TranslationResult) {
        trace!("📝 Histórico: +1 entrada ({} no total)", self.entries.len() + 1);
        self.current = Some(result.clone());
        self.entries.insert(0, result);
    }

    /// Esvazia o log. A tradução atual continua na tela.
    pub fn clear(&mut self) {
        info!("🗑️  Histórico limpo ({} entradas)", self.entries.len());
        self.entries.clear();
    }

    pub fn current(&self) -> Option<&TranslationResult> {
        self.current.as_ref()
    }

    /// Entradas, da mais recente para a mais antiga
    pub fn entries(&self) -> &[TranslationResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_response;

    #[test]
    fn record_adds_exactly_one_entry_newest_first() {
        let mut history = History::new();

        history.record(TranslationResult::new("一", "one"));
        assert_eq!(history.len(), 1);

        history.record(TranslationResult::new("二", "two"));
        assert_eq!(history.len(), 2);

        assert_eq!(history.entries()[0].translated, "two");
        assert_eq!(history.entries()[1].translated, "one");
        assert_eq!(history.current().unwrap().translated, "two");
    }

    #[test]
    fn clear_empties_any_size() {
        let mut history = History::new();
        history.clear();
        assert!(history.is_empty());

        for i in 0..25 {
            history.record(TranslationResult::new("x", format!("{}", i)));
        }
        assert_eq!(history.len(), 25);

        history.clear();
        assert_eq!(history.len(), 0);

        history.record(TranslationResult::new("y", "z"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn parse_miss_shows_raw_reply() {
        let raw = "The image appears to be blank.";
        let result = TranslationResult::from_reply(raw, parse_response(raw));

        assert_eq!(result.source, SEE_BELOW_PLACEHOLDER);
        assert_eq!(result.translated, raw);
    }

    #[test]
    fn missing_source_uses_placeholder() {
        let raw = "ENGLISH:\nHello";
        let result = TranslationResult::from_reply(raw, parse_response(raw));

        assert_eq!(result.source, UNREADABLE_PLACEHOLDER);
        assert_eq!(result.translated, "Hello");
    }

    #[test]
    fn missing_translation_falls_back_to_raw() {
        let raw = "JAPANESE:\nこんにちは";
        let result = TranslationResult::from_reply(raw, parse_response(raw));

        assert_eq!(result.source, "こんにちは");
        assert_eq!(result.translated, raw);
    }

    #[test]
    fn render_contains_both_texts_and_separator() {
        let result = TranslationResult::new("猫", "Cat");
        let text = result.render();

        assert!(text.starts_with('['));
        assert!(text.contains("Original: 猫"));
        assert!(text.contains("Translation: Cat"));
        assert!(text.ends_with(&"─".repeat(50)));
    }
}
