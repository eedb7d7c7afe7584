use bevy::prelude::*;

use super::{spawn_button, TownUi, UiAction, PANEL_BG};
use crate::shared::*;

#[derive(Component)]
pub struct SettingsPanel;

#[derive(Component)]
pub struct SoundStateText;

pub fn sound_label(enabled: bool) -> &'static str {
    if enabled {
        "SOUND: ON"
    } else {
        "SOUND: OFF"
    }
}

pub fn spawn_settings_panel(mut commands: Commands, sound: Res<SoundSettings>) {
    commands
        .spawn((
            SettingsPanel,
            TownUi,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            Visibility::Hidden,
            PickingBehavior::IGNORE,
        ))
        .with_children(|root| {
            root.spawn((
                Interaction::default(),
                Node {
                    width: Val::Px(280.0),
                    padding: UiRect::all(Val::Px(16.0)),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(12.0),
                    ..default()
                },
                BackgroundColor(PANEL_BG),
            ))
            .with_children(|panel| {
                panel.spawn((
                    Text::new("SETTINGS"),
                    TextFont {
                        font_size: 26.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
                panel.spawn((
                    SoundStateText,
                    Text::new(sound_label(sound.enabled)),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
                spawn_button(panel, UiAction::ToggleSound, "TOGGLE SOUND", 180.0);
                spawn_button(panel, UiAction::CloseSettings, "CLOSE", 96.0);
            });
        });
}

pub fn update_sound_label(
    sound: Res<SoundSettings>,
    mut query: Query<&mut Text, With<SoundStateText>>,
) {
    if !sound.is_changed() {
        return;
    }
    for mut text in &mut query {
        text.0 = sound_label(sound.enabled).to_string();
    }
}
