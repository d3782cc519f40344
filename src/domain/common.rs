/// One-line label used in deletion lists and logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}
