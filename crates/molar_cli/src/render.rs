//! Plain-text rendering of session responses.

use molar_core::{format_quantity, Element, Payload, Response};

/// Renders the message line followed by any payload table.
pub fn render_response(response: &Response) -> String {
    let mut lines = vec![response.message.clone()];

    match &response.payload {
        Payload::None | Payload::SavedId(_) | Payload::Count(_) => {}
        Payload::Entries(view) => {
            if let Some(name) = &view.name {
                lines.push(format!("Name: {name}"));
            }
            if !view.entries.is_empty() {
                lines.push(format!("Formula: {}", view.formula));
            }
            for (index, entry) in view.entries.iter().enumerate() {
                lines.push(format!(
                    "  [{index}] {} x {}",
                    entry.symbol,
                    format_quantity(entry.quantity)
                ));
            }
        }
        Payload::Computation(view) => {
            if let Some(name) = &view.name {
                lines.push(format!("Name: {name}"));
            }
            lines.push(format!("Formula: {}", view.formula));
            lines.push(format!(
                "{:<6} {:<18} {:>8} {:>12} {:>12}",
                "Symbol", "Name", "Qty", "Atomic", "Mass"
            ));
            for part in &view.result.breakdown {
                lines.push(format!(
                    "{:<6} {:<18} {:>8} {:>12.4} {:>12.4}",
                    part.symbol,
                    part.name,
                    format_quantity(part.quantity),
                    part.atomic_mass,
                    part.contribution
                ));
            }
        }
        Payload::Element(element) => lines.extend(element_details(element)),
        Payload::Elements(elements) => {
            if !elements.is_empty() {
                lines.push(format!(
                    "{:<4} {:<4} {:<16} {:>10}  {}",
                    "No", "Sym", "Name", "Mass", "Category"
                ));
            }
            for element in elements {
                lines.push(format!(
                    "{:<4} {:<4} {:<16} {:>10.4}  {}",
                    element.atomic_number,
                    element.symbol,
                    element.name,
                    element.atomic_mass,
                    element.category.as_deref().unwrap_or("-")
                ));
            }
        }
        Payload::ReferenceCompounds(items) => {
            for item in items {
                let mut line = format!(
                    "{:<24} {:<10} {:>10.4} g/mol",
                    item.name, item.formula, item.molar_mass
                );
                if let Some(description) = &item.description {
                    line.push_str("  ");
                    line.push_str(description);
                }
                lines.push(line);
            }
        }
        Payload::SavedCompounds(items) => {
            for item in items {
                lines.push(format!(
                    "#{:<5} {:<24} {:>10.4} g/mol  {}  [{}]",
                    item.id, item.name, item.molar_mass, item.created_at, item.formula
                ));
            }
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn element_details(element: &Element) -> Vec<String> {
    let mut lines = vec![
        format!("Symbol:        {}", element.symbol),
        format!("Name:          {}", element.name),
        format!("Atomic mass:   {:.4}", element.atomic_mass),
        format!("Atomic number: {}", element.atomic_number),
    ];
    if let Some(category) = &element.category {
        lines.push(format!("Category:      {category}"));
    }
    if let Some(year) = element.discovered_year {
        lines.push(format!("Discovered:    {year}"));
    }
    lines
}
