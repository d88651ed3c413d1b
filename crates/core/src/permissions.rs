//! Well-known permission names, as stored in `role_permissions`.

/// May list and load note templates in a project.
pub const PERMISSION_SHOW_NOTE_TEMPLATES: &str = "show_note_templates";

/// May create, edit, reorder, and delete note templates in a project.
pub const PERMISSION_EDIT_NOTE_TEMPLATES: &str = "edit_note_templates";

/// All permissions understood by the note template module.
pub const NOTE_TEMPLATE_PERMISSIONS: &[&str] = &[
    PERMISSION_SHOW_NOTE_TEMPLATES,
    PERMISSION_EDIT_NOTE_TEMPLATES,
];
