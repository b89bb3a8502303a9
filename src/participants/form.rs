use hypertext::prelude::*;

use super::{Choices, HOW_HEARD, MAJORS, ProfileForm, TSHIRT_SIZES, YEARS};

/// The inputs of the registration form, pre-filled from `values`.
pub struct ProfileFields<'a> {
    values: &'a ProfileForm,
}

impl<'a> ProfileFields<'a> {
    pub fn new(values: &'a ProfileForm) -> Self {
        Self { values }
    }
}

struct TextField<'a> {
    id: &'static str,
    label: &'static str,
    kind: &'static str,
    value: &'a str,
    placeholder: &'static str,
    help: Option<&'static str>,
    required: bool,
}

impl<'a> TextField<'a> {
    fn text(
        id: &'static str,
        label: &'static str,
        value: &'a str,
        placeholder: &'static str,
    ) -> Self {
        Self {
            id,
            label,
            kind: "text",
            value,
            placeholder,
            help: None,
            required: true,
        }
    }
}

impl<'a> Renderable for TextField<'a> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="mb-3" {
                label for=(self.id) class="form-label" {
                    (self.label)
                    @if self.required { " *" }
                }
                @if self.required {
                    input type=(self.kind) class="form-control" id=(self.id)
                        name=(self.id) value=(self.value)
                        placeholder=(self.placeholder) required;
                } @else {
                    input type=(self.kind) class="form-control" id=(self.id)
                        name=(self.id) value=(self.value)
                        placeholder=(self.placeholder);
                }
                @if let Some(help) = self.help {
                    div class="form-text" { (help) }
                }
            }
        }
        .render_to(buffer);
    }
}

struct SelectField<'a> {
    id: &'static str,
    label: &'static str,
    choices: Choices,
    selected: &'a str,
}

impl<'a> Renderable for SelectField<'a> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="mb-3" {
                label for=(self.id) class="form-label" { (self.label) " *" }
                select name=(self.id) id=(self.id) class="form-select" required {
                    option value="" { "Select…" }
                    @for (value, label) in self.choices {
                        @if *value == self.selected {
                            option value=(*value) selected { (*label) }
                        } @else {
                            option value=(*value) { (*label) }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

impl<'a> Renderable for ProfileFields<'a> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let v = self.values;
        let text = TextField::text;

        maud! {
            div class="row" {
                div class="col-md-6" {
                    (text("first_name", "First Name", &v.first_name, "John"))
                }
                div class="col-md-6" {
                    (text("last_name", "Last Name", &v.last_name, "Doe"))
                }
            }
            (TextField {
                kind: "email",
                help: Some("Preferred: your university email"),
                ..text("email", "Email", &v.email, "data8@sfu.ca")
            })
            (TextField {
                help: Some("9-digit number listed on your student ID"),
                ..text("student_number", "Student Number", &v.student_number, "300913643")
            })
            (SelectField { id: "major", label: "Major", choices: MAJORS, selected: &v.major })
            (SelectField { id: "year", label: "What year are you in?", choices: YEARS, selected: &v.year })
            div class="mb-3" {
                label class="form-label" { "How did you hear about this event? *" }
                @for option in HOW_HEARD {
                    @let id = format!("how_heard_{}", option.replace(' ', "_"));
                    div class="form-check" {
                        @if v.how_heard.iter().any(|h| h == option) {
                            input class="form-check-input" type="checkbox"
                                name="how_heard" value=(*option) id=(&id) checked;
                        } @else {
                            input class="form-check-input" type="checkbox"
                                name="how_heard" value=(*option) id=(&id);
                        }
                        label class="form-check-label" for=(&id) { (*option) }
                    }
                }
            }
            (TextField {
                help: Some("Create a free account at kaggle.com if you haven't already."),
                ..text("kaggle_username", "Kaggle Username", &v.kaggle_username, "your_kaggle_username")
            })
            div class="mb-3" {
                label for="dietary_restrictions" class="form-label" {
                    "Do you have any dietary restrictions? *"
                }
                textarea class="form-control" id="dietary_restrictions"
                    name="dietary_restrictions" rows="3" required
                    placeholder="e.g., Vegetarian, Vegan, Gluten-free, Nut allergy, None" {
                    (v.dietary_restrictions)
                }
            }
            (SelectField { id: "tshirt_size", label: "T-shirt Size", choices: TSHIRT_SIZES, selected: &v.tshirt_size })
            (TextField {
                required: false,
                ..text("discord_username", "Discord Username", &v.discord_username, "")
            })
        }
        .render_to(buffer);
    }
}
