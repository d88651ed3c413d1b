pub mod note_templates;
