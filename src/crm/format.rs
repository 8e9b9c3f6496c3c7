//! 输入框的即时格式化
//!
//! 每次按键都从当前完整输入重新计算，不依赖上一次的结果。

fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 电话号码：`010` → `010-1234` → `010-1234-5678`
pub fn format_phone(raw: &str) -> String {
    let digits = digits_only(raw);
    match digits.len() {
        0..=3 => digits,
        4..=7 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
    }
}

/// 生年月日 + 性别位：超过 6 位后在第 6 位后插入一个连字符
pub fn format_birth(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() <= 6 {
        return digits;
    }
    format!("{}-{}", &digits[..6], &digits[6..])
}
