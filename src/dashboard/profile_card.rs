use hypertext::prelude::*;

use crate::participants::{Participant, TSHIRT_SIZES, label_of};

pub struct ProfileCard<'a> {
    pub participant: &'a Participant,
}

impl<'a> Renderable for ProfileCard<'a> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let p = self.participant;
        let tshirt = label_of(TSHIRT_SIZES, &p.tshirt_size).unwrap_or(&p.tshirt_size);

        maud! {
            div class="card mb-4" {
                div class="card-body" {
                    h2 class="h5 card-title" { "Your registration" }
                    dl class="row mb-0" {
                        dt class="col-sm-4" { "Name" }
                        dd class="col-sm-8" { (p.full_name()) }
                        dt class="col-sm-4" { "Email" }
                        dd class="col-sm-8" { (p.email) }
                        dt class="col-sm-4" { "Major" }
                        dd class="col-sm-8" { (p.major_label()) ", year " (p.year) }
                        dt class="col-sm-4" { "Kaggle" }
                        dd class="col-sm-8" { (p.kaggle_username) }
                        dt class="col-sm-4" { "T-shirt" }
                        dd class="col-sm-8" { (tshirt) }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
