// ocr-translator/src/screenshot.rs

// ============================================================================
// MÓDULO SCREENSHOT - Captura da região e gravação do JPEG
// ============================================================================
// Fluxo: pixels da região → RGB → (reduz se > 1200px de largura) → JPEG 85
// no diretório temporário da sessão (capture_1.jpg, capture_2.jpg, ...).
// ============================================================================

use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Rgba};
use screenshots::Screen;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use thiserror::Error;

use crate::region_selector::CaptureRegion;

/// Largura máxima enviada ao assistente (imagens maiores são reduzidas)
pub const MAX_IMAGE_WIDTH: u32 = 1200;

/// Qualidade do JPEG gravado
pub const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("região inválida ({width}x{height})")]
    DegenerateRegion { width: u32, height: u32 },

    #[error("nenhum monitor encontrado em ({x}, {y}): {reason}")]
    NoScreen { x: i32, y: i32, reason: String },

    #[error("falha ao capturar tela: {0}")]
    Grab(String),

    #[error("falha ao codificar imagem: {0}")]
    Encode(#[from] image::ImageError),

    #[error("falha de E/S: {0}")]
    Io(#[from] std::io::Error),
}

/// Uma captura gravada em disco
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Qualquer coisa capaz de transformar uma região em uma imagem no disco.
/// Existe para o controlador poder ser testado sem tela.
pub trait RegionCapture: Send + Sync {
    /// Captura a região e grava o JPEG
    ///
    /// # Argumentos
    /// * `region` - Retângulo da tela (pode estar parcialmente fora do monitor)
    ///
    /// # Retorna
    /// * `Ok(CapturedImage)` - Caminho e tamanho final da imagem gravada
    /// * `Err(CaptureError)` - Região vazia, monitor não encontrado ou falha de E/S
    fn capture(&self, region: &CaptureRegion) -> Result<CapturedImage, CaptureError>;
}

// ============================================================================
// CAPTURADOR DE TELA
// ============================================================================

/// Captura regiões da tela e grava no diretório temporário da sessão.
///
/// O diretório vive enquanto houver um clone do capturador; os arquivos não
/// são apagados no meio da sessão.
#[derive(Clone)]
pub struct ScreenCapturer {
    dir: Arc<TempDir>,
    counter: Arc<AtomicU32>,
}

impl ScreenCapturer {
    pub fn new() -> Result<Self, CaptureError> {
        let dir = tempfile::Builder::new()
            .prefix("ocr-translator-")
            .tempdir()?;

        info!("📁 Diretório de capturas: {}", dir.path().display());

        Ok(ScreenCapturer {
            dir: Arc::new(dir),
            counter: Arc::new(AtomicU32::new(0)),
        })
    }

    #[cfg(test)]
    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Próximo nome de arquivo (numeração nunca se repete na sessão)
    fn next_path(&self) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.dir.path().join(format!("capture_{}.jpg", n))
    }

    /// Pega os pixels exatamente da região informada
    fn grab(&self, region: &CaptureRegion) -> Result<DynamicImage, CaptureError> {
        if region.is_degenerate() {
            return Err(CaptureError::DegenerateRegion {
                width: region.width,
                height: region.height,
            });
        }

        let screen = Screen::from_point(region.left, region.top).map_err(|e| {
            CaptureError::NoScreen {
                x: region.left,
                y: region.top,
                reason: e.to_string(),
            }
        })?;

        // capture_area usa coordenadas relativas ao monitor
        let (origin_x, origin_y) = (screen.display_info.x, screen.display_info.y);
        let buffer = screen
            .capture_area(
                region.left - origin_x,
                region.top - origin_y,
                region.width,
                region.height,
            )
            .map_err(|e| CaptureError::Grab(e.to_string()))?;

        buffer_to_image(&buffer)
    }

    /// Prepara e grava a imagem como JPEG no diretório da sessão
    pub fn save(&self, image: &DynamicImage) -> Result<CapturedImage, CaptureError> {
        let prepared = prepare_image(image);
        let path = self.next_path();

        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
        encoder.encode(
            prepared.as_raw(),
            prepared.width(),
            prepared.height(),
            image::ColorType::Rgb8,
        )?;

        info!("💾 Imagem salva em: {}", path.display());
        info!("   Tamanho: {}x{}", prepared.width(), prepared.height());

        Ok(CapturedImage {
            path,
            width: prepared.width(),
            height: prepared.height(),
        })
    }
}

impl RegionCapture for ScreenCapturer {
    fn capture(&self, region: &CaptureRegion) -> Result<CapturedImage, CaptureError> {
        info!(
            "📸 Capturando região: {}x{} na posição ({}, {})",
            region.width, region.height, region.left, region.top
        );

        let image = self.grab(region)?;
        self.save(&image)
    }
}

// ============================================================================
// PRÉ-PROCESSAMENTO
// ============================================================================

/// Converte para RGB e limita a largura a `MAX_IMAGE_WIDTH`
pub fn prepare_image(image: &DynamicImage) -> image::RgbImage {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    limit_width(rgb, MAX_IMAGE_WIDTH).to_rgb8()
}

/// Reduz a imagem para `max_width` de largura mantendo a proporção.
/// Imagens que já cabem voltam como estão.
pub fn limit_width(image: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    if width <= max_width {
        return image;
    }

    let ratio = max_width as f64 / width as f64;
    let new_height = ((height as f64 * ratio).round() as u32).max(1);

    trace!(
        "   🔍 Redimensionando: {}x{} → {}x{}",
        width,
        height,
        max_width,
        new_height
    );

    // Lanczos3 mantém as bordas do texto nítidas
    image.resize_exact(max_width, new_height, FilterType::Lanczos3)
}

/// Converte o buffer da screenshot para DynamicImage
fn buffer_to_image(buffer: &screenshots::Image) -> Result<DynamicImage, CaptureError> {
    let width = buffer.width();
    let height = buffer.height();
    let rgba = buffer.rgba();

    let img_buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width as u32, height as u32, rgba.to_vec()).ok_or_else(|| {
            CaptureError::Grab(format!("buffer inconsistente para {}x{}", width, height))
        })?;

    Ok(DynamicImage::ImageRgba8(img_buffer))
}
