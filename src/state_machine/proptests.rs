//! Property-based tests for the turn state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::llm::{LlmResponse, ResponseOutput};
use crate::tools::ToolOutput;
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_response() -> impl Strategy<Value = LlmResponse> {
    prop_oneof![
        ("t[0-9]{1,3}", "[a-zA-Z !]{1,30}").prop_map(|(id, text)| LlmResponse::text(id, text)),
        ("t[0-9]{1,3}", "c[0-9]{1,3}", proptest::option::of(0i64..20)).prop_map(
            |(id, call_id, limit)| {
                let arguments = limit.map(|l| json!({"limit": l}));
                LlmResponse::tool_call(id, call_id, "get_random_cat", arguments)
            }
        ),
    ]
}

fn arb_event() -> impl Strategy<Value = TurnEvent> {
    prop_oneof![
        ("[a-z ]{1,20}", proptest::option::of("t[0-9]{1,3}")).prop_map(|(text, previous)| {
            TurnEvent::UserMessage {
                text,
                previous_response_id: previous,
            }
        }),
        arb_response().prop_map(|response| TurnEvent::CompletionReceived { response }),
        ("c[0-9]{1,3}", any::<bool>(), "[a-z]{0,10}").prop_map(|(call_id, ok, body)| {
            TurnEvent::ToolFinished {
                call_id,
                output: if ok {
                    ToolOutput::success(body)
                } else {
                    ToolOutput::error(body)
                },
            }
        }),
    ]
}

/// Drive a full happy-path turn: user message, then responses in order,
/// answering each tool call with a matching result.
fn drive(text: &str, responses: &[LlmResponse]) -> (TurnState, Vec<Effect>) {
    let mut state = TurnState::Start;
    let mut effects = Vec::new();
    let mut pending = vec![TurnEvent::UserMessage {
        text: text.to_string(),
        previous_response_id: None,
    }];
    let mut responses = responses.iter().cloned();

    while let Some(event) = pending.pop() {
        let Ok(result) = transition(&state, event) else {
            return (state, effects);
        };
        for effect in &result.effects {
            match effect {
                Effect::RequestCompletion { .. } => {
                    if let Some(response) = responses.next() {
                        pending.push(TurnEvent::CompletionReceived { response });
                    }
                }
                Effect::ExecuteTool { call } => pending.push(TurnEvent::ToolFinished {
                    call_id: call.call_id.clone(),
                    output: ToolOutput::success("[]"),
                }),
                Effect::PersistUserMessage { .. } | Effect::PersistAssistantMessage { .. } => {}
            }
        }
        effects.extend(result.effects);
        state = result.new_state;
    }
    (state, effects)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Done is terminal: no event moves a finished turn
    #[test]
    fn prop_done_is_terminal(event in arb_event()) {
        let done = TurnState::Done { message: "m".to_string(), response_id: "t".to_string() };
        prop_assert!(transition(&done, event).is_err());
    }

    /// A turn always persists the user message first and issues at most two
    /// completion requests and one tool execution
    #[test]
    fn prop_turn_shape(
        text in "[a-z ]{1,20}",
        responses in prop::collection::vec(arb_response(), 0..4),
    ) {
        let (state, effects) = drive(&text, &responses);

        prop_assert_eq!(
            effects.first(),
            Some(&Effect::PersistUserMessage { text: text.clone() })
        );

        let requests = effects
            .iter()
            .filter(|e| matches!(e, Effect::RequestCompletion { .. }))
            .count();
        let tools = effects.iter().filter(|e| matches!(e, Effect::ExecuteTool { .. })).count();
        prop_assert!(requests <= 2);
        prop_assert!(tools <= 1);

        // Exactly one assistant message, and only in Done
        let persisted: Vec<_> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::PersistAssistantMessage { text, response_id } => {
                    Some((text.clone(), response_id.clone()))
                }
                _ => None,
            })
            .collect();
        match &state {
            TurnState::Done { message, response_id } => {
                prop_assert_eq!(persisted, vec![(message.clone(), response_id.clone())]);
            }
            _ => {
                prop_assert!(persisted.is_empty());
            }
        }
    }

    /// The follow-up request carries the tool call id and continues from the
    /// response that asked for the tool
    #[test]
    fn prop_followup_threads_call_and_token(
        text in "[a-z ]{1,20}",
        first in arb_response(),
        second in arb_response(),
    ) {
        let (_, effects) = drive(&text, &[first.clone(), second]);

        if let ResponseOutput::ToolCall(call) = &first.output {
            let followup = effects.iter().find_map(|e| match e {
                Effect::RequestCompletion {
                    phase: CompletionPhase::Followup,
                    input,
                    previous_response_id,
                } => Some((input.clone(), previous_response_id.clone())),
                _ => None,
            });
            let (input, previous) = followup.expect("follow-up request");
            prop_assert_eq!(previous, Some(first.id.clone()));
            prop_assert_eq!(input.len(), 2);
            let expected = crate::llm::InputItem::function_output(call.call_id.clone(), "[]");
            prop_assert_eq!(&input[1], &expected);
        } else {
            let has_followup = effects.iter().any(|e| {
                matches!(
                    e,
                    Effect::RequestCompletion { phase: CompletionPhase::Followup, .. }
                )
            });
            prop_assert!(!has_followup);
        }
    }
}
