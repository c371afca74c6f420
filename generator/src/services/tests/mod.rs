//! Tests for generator services against a mock HTTP server and temp directories


use shared::Persona;

pub(crate) fn persona(name: &str) -> Persona {
    Persona {
        name: name.to_string(),
        username: Some(format!("{}_42", name.to_lowercase().replace(' ', "_"))),
        age: 29,
        traits: vec!["observant".to_string(), "dry humoured".to_string()],
        background: format!("{name} repairs vintage radios in a rented garage."),
        chatting_style: "Short sentences, no emoji.".to_string(),
    }
}
