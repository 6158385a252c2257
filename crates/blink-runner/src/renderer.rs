use ascii_tree::{write_tree, Tree};
use blink_core::presentation::{ActionView, ButtonView, Disclaimer};
use blink_core::{ExecutionState, ExecutionStatus, TrustState};

/// Renders an `ActionView` as an ASCII tree for the terminal.
pub fn render_view(url: &str, view: &ActionView) -> Result<String, std::fmt::Error> {
    let title = view.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(url);
    let root_label = format!("{} {} [{}]", trust_icon(view.trust), title, view.status);

    let mut nodes = Vec::new();
    if let Some(description) = view.description.as_deref().filter(|d| !d.is_empty()) {
        nodes.push(Tree::Leaf(vec![description.to_string()]));
    }
    if let Some(website) = &view.website {
        let line = match &website.url {
            Some(link) => format!("🌐 {} ({link})", website.text),
            None => format!("🌐 {}", website.text),
        };
        nodes.push(Tree::Leaf(vec![line]));
    }
    if let Some(image) = &view.image {
        nodes.push(Tree::Leaf(vec![format!("🖼️ {image}")]));
    }

    if !view.buttons.is_empty() {
        let buttons = view.buttons.iter().map(render_button).collect();
        nodes.push(Tree::Node("Buttons".to_string(), buttons));
    }
    if !view.inputs.is_empty() {
        let inputs = view
            .inputs
            .iter()
            .map(|input| {
                Tree::Leaf(vec![format!(
                    "[{}] {{{}}} \"{}\" -> {}",
                    input.component,
                    input.name,
                    input.placeholder,
                    button_label(&input.button)
                )])
            })
            .collect();
        nodes.push(Tree::Node("Inputs".to_string(), inputs));
    }

    if let Some(error) = &view.error {
        nodes.push(Tree::Leaf(vec![format!("❌ {error}")]));
    }
    if let Some(success) = &view.success {
        nodes.push(Tree::Leaf(vec![format!("✅ {success}")]));
    }
    if let Some(disclaimer) = view.disclaimer {
        nodes.push(Tree::Leaf(vec![disclaimer_text(disclaimer).to_string()]));
    }

    let mut buffer = String::new();
    write_tree(&mut buffer, &Tree::Node(root_label, nodes))?;
    Ok(buffer)
}

/// One-line summary of a finished execution
pub fn render_outcome(state: &ExecutionState) -> String {
    match state.status {
        ExecutionStatus::Success => format!(
            "✅ Completed{}",
            state
                .success_message
                .as_deref()
                .map(|m| format!(": {m}"))
                .unwrap_or_default()
        ),
        ExecutionStatus::Error => format!(
            "❌ Failed: {}",
            state.error_message.as_deref().unwrap_or_default()
        ),
        ExecutionStatus::Blocked => "⛔ Blocked: action is flagged as malicious".to_string(),
        ExecutionStatus::Idle => "↩️ Not executed (wallet declined or not connected)".to_string(),
        ExecutionStatus::Executing => "⏳ Executing".to_string(),
    }
}

fn render_button(button: &ButtonView) -> Tree {
    Tree::Leaf(vec![format!("[{}] {}", button.component, button_label(button))])
}

fn button_label(button: &ButtonView) -> String {
    let mut label = button.text.clone();
    if button.loading {
        label.push_str(" ⏳");
    }
    if button.disabled {
        label.push_str(" (disabled)");
    }
    label
}

fn trust_icon(trust: TrustState) -> &'static str {
    match trust {
        TrustState::Trusted => "🛡️",
        TrustState::Unknown => "❔",
        TrustState::Malicious => "⛔",
    }
}

fn disclaimer_text(disclaimer: Disclaimer) -> &'static str {
    match disclaimer {
        Disclaimer::Blocked => {
            "⚠️ This action has been flagged as malicious. Proceed only if you trust the source."
        }
        Disclaimer::Unregistered => {
            "⚠️ This action has not been registered yet. Only use it if you trust the source."
        }
    }
}
