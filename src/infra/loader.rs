use crate::types::{InfraError, InfraResult};
use std::fs;
use std::io::Read;
use std::path::Path;

/// ファイルの内容を文字列として読み込む
/// パースやデータ変換は呼び出し側で行う
pub fn load_text<P: AsRef<Path>>(path: P) -> InfraResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| InfraError::file_system(path.display().to_string(), e))
}

/// パスが `-` なら標準入力、それ以外はファイルから読み込む
pub fn load_text_or_stdin<P: AsRef<Path>>(path: Option<P>) -> InfraResult<String> {
    match path {
        Some(path) if path.as_ref() != Path::new("-") => load_text(path),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| InfraError::file_system("<stdin>", e))?;
            Ok(buf)
        }
    }
}
