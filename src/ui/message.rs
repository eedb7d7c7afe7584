use bevy::prelude::*;

use super::hud::MessageText;
use crate::shared::*;

/// Single slot: the latest message wins, `None` clears.
pub fn update_message_text(
    mut events: EventReader<UserMessageEvent>,
    mut query: Query<&mut Text, With<MessageText>>,
) {
    let Some(latest) = events.read().last() else {
        return;
    };
    let line = latest.message.map(UserMessage::text).unwrap_or_default();
    for mut text in &mut query {
        if text.0 != line {
            text.0 = line.to_string();
        }
    }
}
