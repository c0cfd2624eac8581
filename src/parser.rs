// ocr-translator/src/parser.rs

// ============================================================================
// MÓDULO PARSER - Separa a resposta do assistente em original / tradução
// ============================================================================
//
// O assistente é um gerador de texto genérico: o formato abaixo é só uma
// convenção pedida no prompt, não um contrato. Por isso o parser é tolerante
// e trabalha linha a linha.
//
//   JAPANESE:
//   <texto original>
//
//   ENGLISH:
//   <tradução>
//
// ============================================================================

/// Marcador da seção com o texto original
pub const SOURCE_MARKER: &str = "JAPANESE:";

/// Marcador da seção com a tradução
pub const TRANSLATION_MARKER: &str = "ENGLISH:";

/// Resultado do parse (strings vazias quando nada foi reconhecido)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    pub source: String,
    pub translated: String,
}

impl ParsedResponse {
    /// Nenhuma das duas seções foi encontrada
    pub fn is_empty(&self) -> bool {
        self.source.is_empty() && self.translated.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Source,
    Translation,
}

/// Extrai as seções da resposta. Nunca falha.
///
/// - linha contendo `JAPANESE:` (sem diferenciar maiúsculas) ativa a seção original
/// - linha contendo `ENGLISH:` ativa a seção de tradução
/// - as demais linhas não vazias vão (sem espaços nas pontas) para a seção ativa
/// - texto antes do primeiro marcador é descartado
///
/// Se um marcador aparece de novo, as linhas seguintes são acrescentadas
/// à mesma seção.
///
/// # Argumentos
/// * `raw` - Resposta crua do assistente
///
/// # Retorna
/// * `ParsedResponse` - Seções encontradas (vazias se nenhum marcador apareceu)
pub fn parse_response(raw: &str) -> ParsedResponse {
    let mut source: Vec<&str> = Vec::new();
    let mut translated: Vec<&str> = Vec::new();
    let mut current: Option<Section> = None;

    for line in raw.lines() {
        let stripped = line.trim();
        let upper = stripped.to_uppercase();

        if upper.contains(SOURCE_MARKER) {
            current = Some(Section::Source);
            continue;
        }
        if upper.contains(TRANSLATION_MARKER) {
            current = Some(Section::Translation);
            continue;
        }

        if stripped.is_empty() {
            continue;
        }

        match current {
            Some(Section::Source) => source.push(stripped),
            Some(Section::Translation) => translated.push(stripped),
            None => {}
        }
    }

    ParsedResponse {
        source: source.join("\n"),
        translated: translated.join("\n"),
    }
}
