use hypertext::prelude::*;

pub struct Badge<'a> {
    pub text: &'a str,
    /// A bootstrap colour, e.g. `secondary`.
    pub variant: &'static str,
}

impl<'a> Renderable for Badge<'a> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            span class=(format!("badge text-bg-{} ms-2", self.variant)) {
                (self.text)
            }
        }
        .render_to(buffer);
    }
}
