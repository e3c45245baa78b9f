//! Font loading utilities for the system font database.

use std::sync::Arc;

use fontdb::{Database, Family, Query};

use super::types::{FontData, FontFaces};

/// Load a family's regular face and any dedicated styled faces.
///
/// # Returns
/// `None` if the family has no regular face in the database.
pub fn load_family(db: &Database, family_name: &str) -> Option<FontFaces> {
    let (regular_id, regular) =
        load_face(db, family_name, fontdb::Weight::NORMAL, fontdb::Style::Normal)?;

    // Queries fall back to the closest match, so a styled query may return
    // the regular face again; only keep faces that are really different.
    let styled = |weight, style| {
        load_face(db, family_name, weight, style)
            .filter(|(id, _)| *id != regular_id)
            .map(|(_, face)| face)
    };

    Some(FontFaces {
        bold: styled(fontdb::Weight::BOLD, fontdb::Style::Normal),
        italic: styled(fontdb::Weight::NORMAL, fontdb::Style::Italic),
        bold_italic: styled(fontdb::Weight::BOLD, fontdb::Style::Italic),
        regular,
    })
}

/// Load one face of a family with a specific weight and style.
fn load_face(
    db: &Database,
    family_name: &str,
    weight: fontdb::Weight,
    style: fontdb::Style,
) -> Option<(fontdb::ID, FontData)> {
    let query = Query {
        families: &[Family::Name(family_name)],
        weight,
        style,
        ..Query::default()
    };

    let id = db.query(&query)?;

    // Pass face_index for TrueType Collection files where multiple fonts
    // share the same data but have different face indices.
    let loaded = db.with_face_data(id, |data, face_index| {
        FontData::new_with_index(family_name, Arc::new(data.to_vec()), face_index)
    })?;

    match loaded {
        Ok(face) => Some((id, face)),
        Err(e) => {
            log::warn!("Skipping unreadable face of '{}': {}", family_name, e);
            None
        }
    }
}
