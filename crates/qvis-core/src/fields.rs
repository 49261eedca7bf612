/// Display names for the bibliographic fields a query can be restricted to.
const FIELD_NAMES: &[(&str, &str)] = &[
    ("abstract", "Abstract"),
    ("affiliation", "Affiliation"),
    ("all_fields", "All Fields"),
    ("author", "Author"),
    ("authors", "Authors"),
    ("date_publication", "Date - Publication"),
    ("isbn", "ISBN"),
    ("issue", "Issue"),
    ("journal", "Journal"),
    ("language", "Language"),
    ("mesh_headings", "MeSH Headings"),
    ("mesh_major_topic", "MeSH Major Topic"),
    ("mesh_subheading", "MeSH Subheading"),
    ("mesh_terms", "MeSH Terms"),
    ("publication_type", "Publication Type"),
    ("publisher", "Publisher"),
    ("text", "Text Word"),
    ("title", "Title"),
    ("title_abstract", "Title/Abstract"),
    ("volume", "Volume"),
];

/// Returns the display name for `field`, or the field itself when unknown.
pub fn display_name(field: &str) -> &str {
    FIELD_NAMES
        .iter()
        .find(|(name, _)| *name == field)
        .map_or(field, |&(_, display)| display)
}
