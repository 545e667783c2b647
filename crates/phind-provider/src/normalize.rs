// SPDX-FileCopyrightText: 2026 Phind Adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flattens caller prompts into the `{role, content}` list the endpoint expects.

use phind_core::{Fragment, Prompt, TurnContent};

use crate::types::{NormalizedMessage, USER_ROLE};

/// Converts a prompt into normalized messages. Never fails.
///
/// A text prompt becomes a single `user` message. Conversation turns map
/// one-to-one, in order, with roles passed through unchanged.
pub fn normalize(prompt: &Prompt) -> Vec<NormalizedMessage> {
    match prompt {
        Prompt::Text(text) => vec![NormalizedMessage::new(USER_ROLE, text.as_str())],
        Prompt::Messages(turns) => turns
            .iter()
            .map(|turn| NormalizedMessage::new(turn.role.as_str(), flatten(&turn.content)))
            .collect(),
    }
}

/// Coerces turn content to one string. Fragment lists are joined with a space.
fn flatten(content: &TurnContent) -> String {
    match content {
        TurnContent::Text(text) => text.clone(),
        TurnContent::Fragments(fragments) => fragments
            .iter()
            .map(Fragment::text)
            .collect::<Vec<_>>()
            .join(" "),
        TurnContent::Value(serde_json::Value::String(text)) => text.clone(),
        TurnContent::Value(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phind_core::ConversationTurn;
    use proptest::prelude::*;

    #[test]
    fn text_prompt_becomes_single_user_message() {
        let messages = normalize(&Prompt::from("What is the capital of France?"));
        assert_eq!(
            messages,
            vec![NormalizedMessage::new("user", "What is the capital of France?")]
        );
    }

    #[test]
    fn empty_conversation_yields_empty_list() {
        assert!(normalize(&Prompt::Messages(vec![])).is_empty());
    }

    #[test]
    fn fragments_are_space_joined() {
        let prompt = Prompt::Messages(vec![ConversationTurn::fragments(
            "user",
            vec![
                Fragment::Text("Describe".into()),
                Fragment::NamedText {
                    text: "this".into(),
                },
                Fragment::Other(serde_json::json!({"type": "image", "url": "x"})),
                Fragment::Text("please".into()),
            ],
        )]);
        let messages = normalize(&prompt);
        assert_eq!(messages[0].content, "Describe this  please");
    }

    #[test]
    fn named_text_without_text_contributes_empty() {
        let turn: ConversationTurn = serde_json::from_value(serde_json::json!({
            "role": "user",
            "content": [{"type": "text", "text": "a"}, {"type": "file"}, "b"]
        }))
        .unwrap();
        let messages = normalize(&Prompt::Messages(vec![turn]));
        assert_eq!(messages[0].content, "a  b");
    }

    #[test]
    fn non_text_content_is_coerced_to_string() {
        let prompt = Prompt::Messages(vec![
            ConversationTurn {
                role: "tool".into(),
                content: TurnContent::Value(serde_json::json!(42)),
            },
            ConversationTurn {
                role: "tool".into(),
                content: TurnContent::Value(serde_json::json!(true)),
            },
            ConversationTurn {
                role: "tool".into(),
                content: TurnContent::Value(serde_json::json!("quoted")),
            },
        ]);
        let contents: Vec<String> = normalize(&prompt).into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["42", "true", "quoted"]);
    }

    #[test]
    fn unknown_roles_pass_through() {
        let prompt = Prompt::Messages(vec![ConversationTurn::text("narrator", "Once upon a time")]);
        assert_eq!(normalize(&prompt)[0].role, "narrator");
    }

    proptest! {
        #[test]
        fn text_prompt_round_trips(text in ".*") {
            let messages = normalize(&Prompt::Text(text.clone()));
            prop_assert_eq!(messages.len(), 1);
            prop_assert_eq!(messages[0].role.as_str(), "user");
            prop_assert_eq!(&messages[0].content, &text);
        }

        #[test]
        fn conversation_preserves_length_and_role_order(
            turns in proptest::collection::vec(("[a-z]{1,10}", ".*"), 0..16)
        ) {
            let prompt = Prompt::Messages(
                turns
                    .iter()
                    .map(|(role, content)| ConversationTurn::text(role.as_str(), content.as_str()))
                    .collect(),
            );
            let messages = normalize(&prompt);
            prop_assert_eq!(messages.len(), turns.len());
            for (message, (role, content)) in messages.iter().zip(&turns) {
                prop_assert_eq!(&message.role, role);
                prop_assert_eq!(&message.content, content);
            }
        }

        #[test]
        fn mixed_fragments_join_to_their_texts(
            parts in proptest::collection::vec((any::<bool>(), "[a-zA-Z0-9 ]{0,8}"), 0..8)
        ) {
            let fragments: Vec<Fragment> = parts
                .iter()
                .map(|(named, text)| {
                    if *named {
                        Fragment::NamedText { text: text.clone() }
                    } else {
                        Fragment::Text(text.clone())
                    }
                })
                .collect();
            let expected = parts
                .iter()
                .map(|(_, text)| text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let messages = normalize(&Prompt::Messages(vec![ConversationTurn::fragments(
                "user", fragments,
            )]));
            prop_assert_eq!(&messages[0].content, &expected);
        }
    }
}
