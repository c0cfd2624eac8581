// ocr-translator/src/translator.rs

// ============================================================================
// MÓDULO TRANSLATOR - OCR + tradução via CLI do assistente
// ============================================================================
//
// Toda a parte "inteligente" (ler o texto da imagem e traduzir) fica com o
// CLI externo. Aqui só montamos o prompt, chamamos o processo com timeout
// e devolvemos o stdout.
//
//   claude -p <prompt> --model <modelo> --allowedTools Read
//
// ============================================================================

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use wait_timeout::ChildExt;

use crate::screenshot::CapturedImage;

/// Tempo máximo de uma chamada ao assistente
pub const INVOCATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Tempo máximo do `--version` na verificação inicial
const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

pub const TIMEOUT_MESSAGE: &str = "Translation timeout - please try again";
pub const EMPTY_RESPONSE_MESSAGE: &str = "No response from Claude";

// ============================================================================
// MODELOS
// ============================================================================

/// Modelo do assistente (velocidade x qualidade)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    /// Rápido e barato
    Haiku,
    /// Mais lento, melhor qualidade
    Sonnet,
}

impl Model {
    /// Identificador passado em `--model`
    pub fn id(self) -> &'static str {
        match self {
            Model::Haiku => "haiku",
            Model::Sonnet => "sonnet",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Model::Haiku => "Haiku",
            Model::Sonnet => "Sonnet",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Model::Haiku => "faster",
            Model::Sonnet => "higher quality",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Model::Haiku => Model::Sonnet,
            Model::Sonnet => Model::Haiku,
        }
    }
}

// ============================================================================
// ERROS
// ============================================================================

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("assistente não respondeu em {secs}s")]
    Timeout { secs: u64 },

    #[error("não foi possível iniciar '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("assistente terminou com código {code:?} sem saída")]
    Failed { code: Option<i32> },

    #[error("falha de E/S com o assistente: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// INTERFACE
// ============================================================================

/// Capacidade de transformar uma imagem em texto (OCR + tradução).
///
/// Nunca falha: erros viram uma mensagem legível, porque a UI só exibe texto.
pub trait Translator: Send + Sync {
    fn translate(&self, image: &CapturedImage, model: Model) -> String;
}

// ============================================================================
// IMPLEMENTAÇÃO - CLI do Claude
// ============================================================================

/// Chamada ao CLI do assistente como subprocesso
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    program: String,
    timeout: Duration,
}

impl ClaudeCli {
    pub fn new(program: impl Into<String>) -> Self {
        ClaudeCli {
            program: program.into(),
            timeout: INVOCATION_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Verifica se o CLI está instalado (`<cli> --version` com sucesso)
    pub fn check_available(&self) -> bool {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        hide_console(&mut cmd);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("⚠️  '{}' não encontrado: {}", self.program, e);
                return false;
            }
        };

        match child.wait_timeout(VERSION_CHECK_TIMEOUT) {
            Ok(Some(status)) => status.success(),
            Ok(None) => {
                warn!("⚠️  '{} --version' não respondeu a tempo", self.program);
                let _ = child.kill();
                let _ = child.wait();
                false
            }
            Err(e) => {
                warn!("⚠️  Erro aguardando '{} --version': {}", self.program, e);
                false
            }
        }
    }

    /// Roda o assistente sobre a imagem e devolve a resposta crua
    ///
    /// O limite de tempo vale para a chamada inteira: espera do processo e
    /// leitura dos pipes (um neto que herde o stdout não segura o ciclo).
    ///
    /// # Argumentos
    /// * `image_path` - JPEG gravado pelo capturador
    /// * `model` - Modelo passado em `--model`
    ///
    /// # Retorna
    /// * `Ok(String)` - stdout (ou stderr, se stdout vier vazio)
    /// * `Err(InvocationError)` - Timeout, falha ao iniciar ou saída vazia com erro
    pub fn invoke(&self, image_path: &Path, model: Model) -> Result<String, InvocationError> {
        let abs_path = absolute_path(image_path)?;
        let prompt = build_prompt(&abs_path);

        info!(
            "🤖 Chamando {} ({}) com a imagem: {}",
            self.program,
            model.id(),
            abs_path.display()
        );

        let mut cmd = Command::new(&self.program);
        cmd.arg("-p")
            .arg(&prompt)
            .arg("--model")
            .arg(model.id())
            .arg("--allowedTools")
            .arg("Read")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        hide_console(&mut cmd);

        let deadline = Instant::now() + self.timeout;

        let mut child = cmd.spawn().map_err(|source| InvocationError::Launch {
            program: self.program.clone(),
            source,
        })?;

        // Lê stdout/stderr em threads para o processo não travar com o pipe cheio
        let stdout_reader = read_pipe(child.stdout.take());
        let stderr_reader = read_pipe(child.stderr.take());

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                warn!("⏱️  Assistente excedeu {}s, encerrando", self.timeout.as_secs());
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timeout_error());
            }
            Err(e) => {
                error!("❌ Erro aguardando o assistente: {}", e);
                let _ = child.kill();
                let _ = child.wait();
                return Err(InvocationError::Io(e));
            }
        };

        // Processo terminou, mas algum filho dele pode manter os pipes abertos
        let (stdout, stderr) = match (
            stdout_reader.recv_deadline(deadline),
            stderr_reader.recv_deadline(deadline),
        ) {
            (Ok(stdout), Ok(stderr)) => (stdout, stderr),
            _ => {
                warn!("⏱️  Pipes do assistente continuam abertos após {}s", self.timeout.as_secs());
                return Err(self.timeout_error());
            }
        };

        if !status.success() {
            warn!("⚠️  Assistente terminou com {}", status);
        }

        match select_output(&stdout, &stderr) {
            Some(output) => {
                trace!("📨 Resposta: {}", output.chars().take(300).collect::<String>());
                Ok(output)
            }
            None if !status.success() => Err(InvocationError::Failed {
                code: status.code(),
            }),
            None => Ok(EMPTY_RESPONSE_MESSAGE.to_string()),
        }
    }
}

impl ClaudeCli {
    fn timeout_error(&self) -> InvocationError {
        InvocationError::Timeout {
            secs: self.timeout.as_secs(),
        }
    }
}

impl Translator for ClaudeCli {
    fn translate(&self, image: &CapturedImage, model: Model) -> String {
        match self.invoke(&image.path, model) {
            Ok(text) => text,
            Err(InvocationError::Timeout { .. }) => TIMEOUT_MESSAGE.to_string(),
            Err(e) => {
                error!("❌ Erro ao chamar o assistente: {}", e);
                format!("Error: {}", e)
            }
        }
    }
}

// ============================================================================
// FUNÇÕES AUXILIARES
// ============================================================================

/// Prompt fixo: ler a imagem, OCR do japonês/chinês, tradução para inglês
/// em duas seções rotuladas, mantendo a emoção.
pub fn build_prompt(abs_path: &Path) -> String {
    format!(
        "Read {}\n\
         \n\
         OCR the Japanese/Chinese text and translate to English. Keep the emotion.\n\
         \n\
         JAPANESE:\n\
         [text]\n\
         \n\
         ENGLISH:\n\
         [translation]",
        abs_path.display()
    )
}

/// stdout tem prioridade; stderr só aparece se stdout vier vazio
fn select_output(stdout: &str, stderr: &str) -> Option<String> {
    if !stdout.trim().is_empty() {
        Some(stdout.to_string())
    } else if !stderr.trim().is_empty() {
        Some(stderr.to_string())
    } else {
        None
    }
}

fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Lê o pipe inteiro numa thread; o texto chega pelo canal quando o pipe fecha
fn read_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut bytes);
        }
        let _ = tx.send(String::from_utf8_lossy(&bytes).into_owned());
    });
    rx
}

/// Esconde a janela de console do processo filho no Windows
#[cfg(windows)]
fn hide_console(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    cmd.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console(_cmd: &mut Command) {}
