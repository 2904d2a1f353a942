use crate::domain::model::TurnStatus;

pub const TURN_MARKER: &str = "Waiting for";

/// 從頁面文字中取出目前等待中的玩家
///
/// 只看第一個以 "Waiting for" 開頭的行；該行至少要有三個詞（標記 + 玩家），
/// 否則視為本週期沒有回合資訊。
pub fn parse_active_player(page_text: &str) -> Option<String> {
    let line = page_text
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(TURN_MARKER))?;

    tracing::debug!("Found turn status: {}", line);

    if line.split_whitespace().count() < 3 {
        return None;
    }

    let rest = &line[TURN_MARKER.len()..];
    // "Waiting forever ..." 之類的行不算
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let player = rest.trim();
    if player.is_empty() {
        None
    } else {
        Some(player.to_string())
    }
}

pub fn parse_turn_status(page_text: &str) -> TurnStatus {
    TurnStatus::new(parse_active_player(page_text))
}
