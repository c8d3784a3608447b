//! The settings panel: projection dropdown and show/hide toggle.

use crate::projection::ProjectionId;
use crate::render::Document;
use crate::{MapError, Result};

/// Class marking the settings panel as open
pub const ACTIVE_CLASS: &str = "active";

/// Replace the options of the `<select>` matching `selector` with one per
/// projection, marking `current` as selected. Returns the option count.
pub fn populate_projection_dropdown(
    doc: &mut dyn Document,
    selector: &str,
    projections: &[ProjectionId],
    current: ProjectionId,
) -> Result<usize> {
    let dropdown = doc
        .query(selector)
        .ok_or_else(|| MapError::MissingElement(selector.to_string()))?;
    doc.clear_children(dropdown)?;

    for id in projections {
        let option = doc.create_element(dropdown, "option")?;
        doc.set_attribute(option, "value", id.label())?;
        doc.set_text(option, id.label())?;
        if *id == current {
            doc.set_attribute(option, "selected", "true")?;
        }
    }

    log::debug!("projection dropdown filled with {} options", projections.len());
    Ok(projections.len())
}

/// Open or close the settings panel; returns whether it is now open
pub fn toggle_settings_panel(doc: &mut dyn Document, selector: &str) -> Result<bool> {
    let panel = doc
        .query(selector)
        .ok_or_else(|| MapError::MissingElement(selector.to_string()))?;
    doc.toggle_class(panel, ACTIVE_CLASS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MemoryDocument;

    #[test]
    fn test_dropdown_lists_projections_in_order() {
        let mut doc = MemoryDocument::host_page();
        let count = populate_projection_dropdown(
            &mut doc,
            "#settings-dropdown",
            &ProjectionId::ALL,
            ProjectionId::NaturalEarth,
        )
        .unwrap();
        assert_eq!(count, 13);

        let options = doc.query_all("select > option");
        assert_eq!(options.len(), 13);
        assert_eq!(doc.text(options[0]), Some("Albers"));
        assert_eq!(doc.attribute(options[1], "value").as_deref(), Some("Azimuthal I"));

        let selected = doc.find_by_attribute("selected", "true");
        assert_eq!(selected.len(), 1);
        assert_eq!(doc.text(selected[0]), Some("Natural Earth"));
    }

    #[test]
    fn test_repopulating_replaces_options() {
        let mut doc = MemoryDocument::host_page();
        let ids = [ProjectionId::Mercator, ProjectionId::Gnomonic];
        populate_projection_dropdown(&mut doc, "#settings-dropdown", &ids, ProjectionId::Gnomonic).unwrap();
        populate_projection_dropdown(&mut doc, "#settings-dropdown", &ids, ProjectionId::Gnomonic).unwrap();
        assert_eq!(doc.query_all("option").len(), 2);
    }

    #[test]
    fn test_toggle_settings_panel() {
        let mut doc = MemoryDocument::host_page();
        assert!(toggle_settings_panel(&mut doc, "#settings-container").unwrap());
        let panel = doc.query("#settings-container").unwrap();
        assert!(doc.has_class(panel, "active"));
        assert!(!toggle_settings_panel(&mut doc, "#settings-container").unwrap());
        assert!(!doc.has_class(panel, "active"));
    }

    #[test]
    fn test_missing_controls() {
        let mut doc = MemoryDocument::new();
        assert!(matches!(
            toggle_settings_panel(&mut doc, "#settings-container"),
            Err(MapError::MissingElement(_))
        ));
        assert!(populate_projection_dropdown(&mut doc, "select", &[], ProjectionId::Albers).is_err());
    }
}
