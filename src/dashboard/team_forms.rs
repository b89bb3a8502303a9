use hypertext::prelude::*;

use crate::teams::code::CODE_LEN;

/// Side-by-side forms for creating a team or joining one by code.
pub struct TeamForms<'a> {
    /// Pre-filled from an invite link.
    pub join_code: &'a str,
}

impl<'a> Renderable for TeamForms<'a> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="row g-4 mb-4" {
                div class="col-md-6" {
                    div class="card h-100" {
                        div class="card-body" {
                            h2 class="h5 card-title" { "Create a team" }
                            form method="post" action="/teams/create" {
                                div class="mb-3" {
                                    label for="name" class="form-label" { "Team name" }
                                    input type="text" class="form-control" id="name"
                                        name="name" maxlength="64" required;
                                }
                                div class="mb-3" {
                                    label for="institution" class="form-label" { "University" }
                                    input type="text" class="form-control" id="institution"
                                        name="institution" maxlength="64" required;
                                }
                                button type="submit" class="btn btn-primary" {
                                    "Create team"
                                }
                            }
                        }
                    }
                }
                div class="col-md-6" {
                    div class="card h-100" {
                        div class="card-body" {
                            h2 class="h5 card-title" { "Join a team" }
                            form method="post" action="/teams/join" {
                                div class="mb-3" {
                                    label for="code" class="form-label" { "Team code" }
                                    input type="text" class="form-control text-uppercase"
                                        id="code" name="code" value=(self.join_code)
                                        maxlength=(CODE_LEN) minlength=(CODE_LEN)
                                        required;
                                }
                                button type="submit" class="btn btn-outline-primary" {
                                    "Join team"
                                }
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
