/// 按 nmcli `--terse` 格式拆分一行输出。
///
/// terse 模式下字段之间以 `:` 分隔，字段值内部的 `:` 和 `\` 会被转义成
/// `\:` 和 `\\`。这里按转义规则切分并还原字段值；未知的转义序列原样保留。
pub fn split_terse_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next @ (':' | '\\')) => current.push(next),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                // 以单个 '\' 结尾
                None => current.push('\\'),
            },
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
