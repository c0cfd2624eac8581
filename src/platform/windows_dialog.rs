// ocr-translator/src/platform/windows_dialog.rs

// ============================================================================
// CAIXA DE MENSAGEM NATIVA PARA ERROS FATAIS (WINDOWS)
// ============================================================================
// Quem abre o programa pelo atalho não vê o console; erros de inicialização
// também aparecem numa MessageBox antes de sair.

#[cfg(windows)]
pub fn show_fatal_error(title: &str, message: &str) {
    use widestring::U16CString;
    use winapi::um::winuser::{MessageBoxW, MB_ICONERROR, MB_OK};

    let (title, message) = match (U16CString::from_str(title), U16CString::from_str(message)) {
        (Ok(t), Ok(m)) => (t, m),
        _ => {
            warn!("⚠️  Mensagem com caractere nulo, MessageBox não exibida");
            return;
        }
    };

    unsafe {
        MessageBoxW(
            std::ptr::null_mut(),
            message.as_ptr(),
            title.as_ptr(),
            MB_OK | MB_ICONERROR,
        );
    }
}

#[cfg(not(windows))]
pub fn show_fatal_error(_title: &str, _message: &str) {}
