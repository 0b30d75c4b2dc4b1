use std::path::Path;

/// 把文本按行切分，`\r\n`、`\n` 和单独的 `\r` 都视为换行。
/// 行尾的换行符不会出现在结果中，最后一个换行之后的空串也不会。
pub fn split_text_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = content;
    while let Some(pos) = rest.find(['\r', '\n']) {
        lines.push(&rest[..pos]);
        let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + skip..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }
    lines
}

/// 从路径中取出文件名（不含目录），用于界面显示。
pub fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_text_lines() {
        assert_eq!(split_text_lines(""), Vec::<&str>::new());
        assert_eq!(split_text_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_text_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
        assert_eq!(split_text_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_text_lines("\n"), vec![""]);
    }
}
