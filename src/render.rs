//! Plain-text rendering for the terminal. Rendering is a pure function of its input, so the
//! whole transcript can be redrawn after every turn.

use crate::retrieval::Corpus;
use crate::transcript::{GenerationTurn, Speaker};

const CAPTION_CHARS: usize = 300;

pub fn render_papers(corpus: &Corpus) -> String {
    if corpus.is_empty() {
        return "No papers found.\n".to_string();
    }

    let mut out = String::from("## Top Papers\n\n");
    for paper in corpus {
        out.push_str(&format!(
            "**{}** ({})\n  {}...\n\n",
            paper.title,
            paper.link,
            truncate(&paper.summary, CAPTION_CHARS)
        ));
    }
    out
}

pub fn render_transcript(turns: &[GenerationTurn]) -> String {
    turns.iter().map(render_turn).collect::<Vec<_>>().join("\n")
}

pub fn render_turn(turn: &GenerationTurn) -> String {
    let mut out = match &turn.speaker {
        Speaker::System => format!("> {}\n", turn.text),
        Speaker::Persona(name) => format!("**{} says:** {}\n", name, turn.text),
        speaker => format!("**{}:** {}\n", speaker, turn.text),
    };
    if let Some(artifact) = &turn.artifact {
        out.push_str(&format!("\n### {}\n{}\n", artifact.title, artifact.html));
    }
    out
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
