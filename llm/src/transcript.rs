//! Renders the recent conversation and the current question into the single
//! text block both providers receive.

use crate::api::{GenerateRequest, HistoryTurn, Role};

/// Number of prior turns sent along with a question.
pub const HISTORY_WINDOW: usize = 5;

const HISTORY_HEADER: &str = "Histórico da conversa:\n";
const QUESTION_LABEL: &str = "Pergunta do Aluno: ";

/// The last [`HISTORY_WINDOW`] turns, oldest first.
pub fn recent(history: &[HistoryTurn]) -> &[HistoryTurn] {
    &history[history.len().saturating_sub(HISTORY_WINDOW)..]
}

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "Aluno",
        Role::Assistant => "Professor",
    }
}

pub fn build_prompt(request: &GenerateRequest) -> String {
    let turns = recent(&request.history);
    let mut out = String::new();

    if !turns.is_empty() {
        out.push_str(HISTORY_HEADER);
        let lines: Vec<String> = turns
            .iter()
            .map(|turn| format!("{}: {}", label(turn.role), turn.text))
            .collect();
        out.push_str(&lines.join("\n"));
        out.push_str("\n\n");
    }

    out.push_str(QUESTION_LABEL);
    out.push_str(&request.prompt);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Mode;

    #[test]
    fn test_no_history() {
        let request = GenerateRequest::new("O que é um verbo?", Mode::Standard);
        assert_eq!(build_prompt(&request), "Pergunta do Aluno: O que é um verbo?");
    }

    #[test]
    fn test_labels_and_layout() {
        let request = GenerateRequest::new("E o sujeito?", Mode::Standard).with_history(vec![
            HistoryTurn::user("O que é um verbo?"),
            HistoryTurn::assistant("Uma palavra que exprime ação."),
        ]);
        assert_eq!(
            build_prompt(&request),
            "Histórico da conversa:\n\
             Aluno: O que é um verbo?\n\
             Professor: Uma palavra que exprime ação.\n\n\
             Pergunta do Aluno: E o sujeito?"
        );
    }

    #[test]
    fn test_only_last_five_turns_are_sent() {
        let history: Vec<HistoryTurn> = (1..=8)
            .map(|i| {
                if i % 2 == 1 {
                    HistoryTurn::user(format!("pergunta {}", i))
                } else {
                    HistoryTurn::assistant(format!("resposta {}", i))
                }
            })
            .collect();

        assert_eq!(recent(&history).len(), HISTORY_WINDOW);
        assert_eq!(recent(&history)[0].text, "resposta 4");

        let prompt = build_prompt(&GenerateRequest::new("?", Mode::Standard).with_history(history));
        for dropped in ["pergunta 1", "resposta 2", "pergunta 3"] {
            assert!(!prompt.contains(dropped), "{} should be outside the window", dropped);
        }
        for kept in ["resposta 4", "pergunta 5", "resposta 6", "pergunta 7", "resposta 8"] {
            assert!(prompt.contains(kept));
        }
    }

    #[test]
    fn test_short_history_is_kept_whole() {
        let history = vec![HistoryTurn::user("a"), HistoryTurn::assistant("b")];
        assert_eq!(recent(&history), history.as_slice());
    }
}
