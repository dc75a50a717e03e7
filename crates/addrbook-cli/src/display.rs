//! Terminal rendering for address cards, the header, and the login surface.

use addrbook_app::{Entry, EntryMode, Header, LoginSurface, Placement};
use addrbook_core::{AddressField, AddressFields, AddressRecord};

const LABEL_WIDTH: usize = 14;

// ── Public API ──

pub fn print_header(header: &Header) {
    println!("{}", render_header(header));
}

/// Print the list, or the empty-state line when there is nothing saved.
pub fn print_entries(entries: &[Entry]) {
    println!("Your Addresses");
    println!();
    if entries.is_empty() {
        println!("No addresses added.");
        return;
    }
    for entry in entries {
        print!("{}", render_entry(entry));
        println!();
    }
}

pub fn print_record(record: &AddressRecord) {
    print!("{}", render_card(record));
}

pub fn print_login(surface: &LoginSurface) {
    println!("=== {} ===", surface.title);
    println!("  {:<LABEL_WIDTH$} {}", "Backdrop", surface.backdrop);
    println!("  Set ADDRBOOK_TOKEN (or pass --token) to sign in.");
}

// ── Rendering ──

fn render_header(header: &Header) -> String {
    let mut line = String::from("addrbook");
    if let Some(name) = &header.display_name {
        line.push_str(&format!("  |  {name}"));
    } else if header.authenticated {
        line.push_str("  |  signed in");
    }
    if header.show_sign_in {
        line.push_str("  |  sign in");
    }
    match header.placement {
        Placement::Overlay => line,
        Placement::Inline => format!("{line}\n{}", "-".repeat(line.len())),
    }
}

fn render_fields(out: &mut String, fields: &AddressFields) {
    for field in AddressField::ALL {
        out.push_str(&format!(
            "  {:<LABEL_WIDTH$} {}\n",
            field.label(),
            fields.get(field)
        ));
    }
}

fn render_card(record: &AddressRecord) -> String {
    let mut out = format!("=== {} [{}] ===\n", record.fields.full_name, record.id);
    render_fields(&mut out, &record.fields);
    out
}

fn render_entry(entry: &Entry) -> String {
    match (entry.mode, &entry.draft) {
        (EntryMode::Editing, Some(draft)) => {
            let mut out = format!(
                "=== {} [{}] (editing) ===\n",
                entry.record.fields.full_name, entry.record.id
            );
            render_fields(&mut out, draft);
            out
        }
        _ => render_card(&entry.record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AddressRecord {
        AddressRecord::new(
            "3",
            AddressFields {
                full_name: "Kiran".into(),
                phone: "0471".into(),
                city: "Thiruvananthapuram".into(),
                state: "Kerala".into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn card_lists_every_field() {
        let card = render_card(&record());
        assert!(card.starts_with("=== Kiran [3] ===\n"));
        for field in AddressField::ALL {
            assert!(card.contains(field.label()), "missing {}", field.label());
        }
        assert!(card.contains("0471"));
    }

    #[test]
    fn editing_entry_shows_draft() {
        let mut draft = record().fields;
        draft.city = "Kollam".into();
        let entry = Entry {
            record: record(),
            mode: EntryMode::Editing,
            draft: Some(draft),
        };
        let out = render_entry(&entry);
        assert!(out.contains("(editing)"));
        assert!(out.contains("Kollam"));
        assert!(!out.contains("Thiruvananthapuram"));
    }

    #[test]
    fn inline_header_is_underlined() {
        let header = Header {
            placement: Placement::Inline,
            authenticated: true,
            display_name: Some("Kiran".into()),
            show_sign_in: false,
        };
        assert_eq!(render_header(&header), "addrbook  |  Kiran\n------------------");
    }
}
