// ocr-translator/src/region_selector.rs

// ============================================================================
// MÓDULO REGION SELECTOR - Janela translúcida que marca a área de captura
// ============================================================================
//
// A região é uma janela sem bordas, sempre no topo:
// - arrastar pelo centro move a janela
// - arrastar pela borda redimensiona (mínimo 200x100)
//
// Mover/redimensionar é feito pelo sistema (StartDrag / BeginResize); a cada
// frame lemos a geometria real da janela de volta para `CaptureRegion`.
// ============================================================================

use eframe::egui;
use eframe::egui::viewport::ResizeDirection;

use crate::theme::Theme;

/// Largura mínima da região
pub const MIN_REGION_WIDTH: u32 = 200;

/// Altura mínima da região
pub const MIN_REGION_HEIGHT: u32 = 100;

/// Espessura da faixa da borda que redimensiona
pub const RESIZE_BORDER: f32 = 10.0;

const OVERLAY_STROKE: f32 = 3.0;

const INSTRUCTIONS: &str = "Position over text area\nDrag edges to resize | Drag center to move";

/// Retângulo da tela a ser capturado (pixels lógicos da tela)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    /// Região sem área (não dá para capturar)
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// O que um clique-e-arraste dentro da região faz
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragMode {
    Move,
    Resize(ResizeDirection),
}

/// Estado da região de captura
#[derive(Debug)]
pub struct RegionSelector {
    region: CaptureRegion,
    /// Geometria usada ao (re)criar a janela
    spawn: CaptureRegion,
    visible: bool,
}

impl RegionSelector {
    pub fn new(initial: CaptureRegion) -> Self {
        let region = clamp_to_floor(
            initial.left,
            initial.top,
            initial.width as f32,
            initial.height as f32,
        );

        RegionSelector {
            region,
            spawn: region,
            visible: true,
        }
    }

    /// Geometria atual da região
    pub fn region(&self) -> CaptureRegion {
        self.region
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Mostra/esconde a janela da região sem perder a posição
    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.spawn = self.region;
        }
        info!(
            "🔲 Região de captura: {}",
            if self.visible { "visível" } else { "escondida" }
        );
    }

    /// Atualiza a geometria a partir do que a janela informa.
    /// Devolve `true` se o tamanho precisou subir até o mínimo.
    pub fn update_geometry(&mut self, left: f32, top: f32, width: f32, height: f32) -> bool {
        let clamped = clamp_to_floor(left.round() as i32, top.round() as i32, width, height);
        let raised = clamped.width as f32 > width.round() || clamped.height as f32 > height.round();

        if clamped != self.region {
            trace!(
                "🔲 Região: {}x{} em ({}, {})",
                clamped.width,
                clamped.height,
                clamped.left,
                clamped.top
            );
        }
        self.region = clamped;
        raised
    }

    /// Desenha a janela da região (viewport imediato) e trata o arraste
    pub fn show(&mut self, ctx: &egui::Context, theme: &Theme) {
        if !self.visible {
            return;
        }

        let spawn = self.spawn;
        let builder = egui::ViewportBuilder::default()
            .with_title("Capture Region")
            .with_position([spawn.left as f32, spawn.top as f32])
            .with_inner_size([spawn.width as f32, spawn.height as f32])
            .with_min_inner_size([MIN_REGION_WIDTH as f32, MIN_REGION_HEIGHT as f32])
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_resizable(true);

        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("capture_region"),
            builder,
            |ctx, _class| {
                // Sincroniza com a geometria real da janela
                if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
                    if self.update_geometry(rect.min.x, rect.min.y, rect.width(), rect.height()) {
                        let region = self.region;
                        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
                            region.width as f32,
                            region.height as f32,
                        )));
                    }
                }

                let frame = egui::Frame::none()
                    .fill(egui::Color32::from_rgba_unmultiplied(255, 255, 255, 20))
                    .stroke(egui::Stroke::new(OVERLAY_STROKE, theme.overlay));

                egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
                    let rect = ui.max_rect();

                    ui.painter().text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        INSTRUCTIONS,
                        egui::FontId::proportional(13.0),
                        theme.overlay,
                    );

                    let response = ui.interact(
                        rect,
                        egui::Id::new("capture_region_body"),
                        egui::Sense::drag(),
                    );

                    if response.drag_started() {
                        if let Some(pos) = response.interact_pointer_pos() {
                            let local = pos - rect.min;
                            match drag_mode(local.x, local.y, rect.width(), rect.height()) {
                                DragMode::Move => {
                                    ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
                                }
                                DragMode::Resize(direction) => {
                                    ctx.send_viewport_cmd(egui::ViewportCommand::BeginResize(
                                        direction,
                                    ));
                                }
                            }
                        }
                    }

                    // Cursor indica a ação disponível
                    if let Some(pos) = response.hover_pos() {
                        let local = pos - rect.min;
                        let icon = match drag_mode(local.x, local.y, rect.width(), rect.height()) {
                            DragMode::Move => egui::CursorIcon::Move,
                            DragMode::Resize(_) => egui::CursorIcon::ResizeNwSe,
                        };
                        ctx.set_cursor_icon(icon);
                    }
                });
            },
        );
    }
}

/// Aplica o tamanho mínimo. Posição pode ficar fora da tela.
pub fn clamp_to_floor(left: i32, top: i32, width: f32, height: f32) -> CaptureRegion {
    let width = if width.is_finite() { width.round().max(0.0) as u32 } else { 0 };
    let height = if height.is_finite() { height.round().max(0.0) as u32 } else { 0 };

    CaptureRegion {
        left,
        top,
        width: width.max(MIN_REGION_WIDTH),
        height: height.max(MIN_REGION_HEIGHT),
    }
}

/// Decide entre mover (centro) e redimensionar (faixa da borda)
pub fn drag_mode(x: f32, y: f32, width: f32, height: f32) -> DragMode {
    let west = x <= RESIZE_BORDER;
    let east = x >= width - RESIZE_BORDER;
    let north = y <= RESIZE_BORDER;
    let south = y >= height - RESIZE_BORDER;

    let direction = match (north, south, west, east) {
        (true, _, true, _) => ResizeDirection::NorthWest,
        (true, _, _, true) => ResizeDirection::NorthEast,
        (_, true, true, _) => ResizeDirection::SouthWest,
        (_, true, _, true) => ResizeDirection::SouthEast,
        (true, _, _, _) => ResizeDirection::North,
        (_, true, _, _) => ResizeDirection::South,
        (_, _, true, _) => ResizeDirection::West,
        (_, _, _, true) => ResizeDirection::East,
        _ => return DragMode::Move,
    };

    DragMode::Resize(direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(left: i32, top: i32, width: u32, height: u32) -> CaptureRegion {
        CaptureRegion {
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn small_sizes_are_raised_to_the_floor() {
        for (w, h) in [(0.0, 0.0), (-50.0, -10.0), (199.0, 99.0), (1.0, 500.0), (f32::NAN, 20.0)] {
            let r = clamp_to_floor(10, 20, w, h);
            assert!(r.width >= MIN_REGION_WIDTH, "largura {} para {}", r.width, w);
            assert!(r.height >= MIN_REGION_HEIGHT, "altura {} para {}", r.height, h);
            assert!(!r.is_degenerate());
        }

        assert_eq!(clamp_to_floor(10, 20, 1.0, 500.0), region(10, 20, 200, 500));
    }

    #[test]
    fn sizes_above_the_floor_are_kept() {
        assert_eq!(clamp_to_floor(-40, 3000, 640.0, 120.0), region(-40, 3000, 640, 120));
    }

    #[test]
    fn selector_clamps_initial_geometry() {
        let selector = RegionSelector::new(region(100, 500, 50, 20));
        assert_eq!(selector.region(), region(100, 500, 200, 100));
    }

    #[test]
    fn update_reports_when_floor_was_applied() {
        let mut selector = RegionSelector::new(region(100, 500, 800, 200));

        assert!(!selector.update_geometry(120.0, 480.0, 900.4, 250.0));
        assert_eq!(selector.region(), region(120, 480, 900, 250));

        assert!(selector.update_geometry(120.0, 480.0, 150.0, 250.0));
        assert_eq!(selector.region(), region(120, 480, 200, 250));
    }

    #[test]
    fn region_may_extend_past_the_screen() {
        let mut selector = RegionSelector::new(region(0, 0, 800, 200));
        selector.update_geometry(-300.0, 5000.0, 800.0, 200.0);

        assert_eq!(selector.region(), region(-300, 5000, 800, 200));
    }

    #[test]
    fn toggling_visibility_keeps_geometry() {
        let mut selector = RegionSelector::new(region(100, 500, 800, 200));
        selector.update_geometry(300.0, 200.0, 640.0, 160.0);

        selector.toggle_visible();
        assert!(!selector.is_visible());
        selector.toggle_visible();
        assert!(selector.is_visible());

        assert_eq!(selector.region(), region(300, 200, 640, 160));
        assert_eq!(selector.spawn, region(300, 200, 640, 160));
    }

    #[test]
    fn center_moves_and_border_resizes() {
        assert_eq!(drag_mode(400.0, 100.0, 800.0, 200.0), DragMode::Move);
        assert_eq!(
            drag_mode(795.0, 100.0, 800.0, 200.0),
            DragMode::Resize(ResizeDirection::East)
        );
        assert_eq!(
            drag_mode(400.0, 198.0, 800.0, 200.0),
            DragMode::Resize(ResizeDirection::South)
        );
        assert_eq!(
            drag_mode(799.0, 199.0, 800.0, 200.0),
            DragMode::Resize(ResizeDirection::SouthEast)
        );
        assert_eq!(
            drag_mode(2.0, 2.0, 800.0, 200.0),
            DragMode::Resize(ResizeDirection::NorthWest)
        );
    }
}
