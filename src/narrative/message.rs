use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Narrative,
    System,
}

/// Side effects the host should apply alongside a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMeta {
    /// Damage a creature dealt to the player
    pub player_damage: f32,
}

/// One line for the player's message log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeMessage {
    pub text: String,
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MessageMeta>,
}

impl NarrativeMessage {
    pub fn narrative(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Narrative,
            meta: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::System,
            meta: None,
        }
    }

    pub fn with_player_damage(mut self, damage: f32) -> Self {
        self.meta = Some(MessageMeta {
            player_damage: damage,
        });
        self
    }

    pub fn player_damage(&self) -> f32 {
        self.meta.map(|m| m.player_damage).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_meta_serializes() {
        let message = NarrativeMessage::narrative("The wolf bites!").with_player_damage(7.0);
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["kind"], "narrative");
        assert_eq!(json["meta"]["player_damage"], 7.0);
        assert_eq!(message.player_damage(), 7.0);
    }

    #[test]
    fn test_plain_message_omits_meta() {
        let json = serde_json::to_value(NarrativeMessage::system("tick")).unwrap();
        assert!(json.get("meta").is_none());
    }
}
