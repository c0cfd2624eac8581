// ocr-translator/src/theme.rs

// ============================================================================
// MÓDULO THEME - Paletas de cores da janela e da região de captura
// ============================================================================

use egui::Color32;

/// Uma paleta de cores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    /// Fundo da janela
    pub bg: Color32,
    /// Fundo do cabeçalho e do histórico
    pub header: Color32,
    /// Título, molduras e botão Clear
    pub accent: Color32,
    /// Borda da região de captura
    pub overlay: Color32,
    /// Botões ativos e texto traduzido
    pub success: Color32,
    /// Botões inativos e caixas de texto
    pub button: Color32,
    /// Texto secundário
    pub text: Color32,
}

pub const THEMES: [Theme; 5] = [
    Theme {
        name: "Cyber Blue",
        bg: Color32::from_rgb(0x0a, 0x16, 0x28),
        header: Color32::from_rgb(0x0d, 0x21, 0x37),
        accent: Color32::from_rgb(0x00, 0xd4, 0xff),
        overlay: Color32::from_rgb(0x00, 0x80, 0xff),
        success: Color32::from_rgb(0x00, 0xff, 0xff),
        button: Color32::from_rgb(0x1e, 0x3a, 0x5f),
        text: Color32::from_rgb(0xa0, 0xa0, 0xa0),
    },
    Theme {
        name: "Matrix",
        bg: Color32::from_rgb(0x0d, 0x0d, 0x0d),
        header: Color32::from_rgb(0x0a, 0x1a, 0x0a),
        accent: Color32::from_rgb(0x00, 0xff, 0x41),
        overlay: Color32::from_rgb(0x00, 0xcc, 0x33),
        success: Color32::from_rgb(0x39, 0xff, 0x14),
        button: Color32::from_rgb(0x1a, 0x3a, 0x1a),
        text: Color32::from_rgb(0xa0, 0xa0, 0xa0),
    },
    Theme {
        name: "Sunset",
        bg: Color32::from_rgb(0x1a, 0x14, 0x10),
        header: Color32::from_rgb(0x2a, 0x1a, 0x10),
        accent: Color32::from_rgb(0xff, 0x6b, 0x35),
        overlay: Color32::from_rgb(0xff, 0x95, 0x00),
        success: Color32::from_rgb(0xff, 0xc1, 0x07),
        button: Color32::from_rgb(0x4a, 0x30, 0x20),
        text: Color32::from_rgb(0xa0, 0xa0, 0xa0),
    },
    Theme {
        name: "Violet",
        bg: Color32::from_rgb(0x13, 0x09, 0x1f),
        header: Color32::from_rgb(0x1a, 0x0d, 0x2e),
        accent: Color32::from_rgb(0x9d, 0x4e, 0xdd),
        overlay: Color32::from_rgb(0x7b, 0x2c, 0xbf),
        success: Color32::from_rgb(0xe0, 0x40, 0xfb),
        button: Color32::from_rgb(0x2d, 0x1b, 0x4e),
        text: Color32::from_rgb(0xa0, 0xa0, 0xa0),
    },
    Theme {
        name: "Arctic",
        bg: Color32::from_rgb(0x1a, 0x1d, 0x21),
        header: Color32::from_rgb(0x22, 0x26, 0x2b),
        accent: Color32::from_rgb(0xa8, 0xda, 0xdc),
        overlay: Color32::from_rgb(0x45, 0x7b, 0x9d),
        success: Color32::from_rgb(0xf1, 0xfa, 0xee),
        button: Color32::from_rgb(0x2d, 0x34, 0x36),
        text: Color32::from_rgb(0xa0, 0xa0, 0xa0),
    },
];

/// Índice do tema pelo nome (sem diferenciar maiúsculas). Desconhecido → primeiro.
pub fn index_of(name: &str) -> usize {
    THEMES
        .iter()
        .position(|t| t.name.eq_ignore_ascii_case(name.trim()))
        .unwrap_or(0)
}

/// Próximo tema da lista (volta ao primeiro no fim)
pub fn next_index(current: usize) -> usize {
    (current + 1) % THEMES.len()
}
