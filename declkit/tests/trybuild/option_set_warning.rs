//! Trybuild fixture: an explicit discriminant on an `Options` case is
//! reported as a warning but does not stop expansion.

declkit::option_set! {
    #[derive(Debug)]
    struct Permissions {
        #[repr(u8)]
        enum Options { Read = 4, Write, Execute }
    }
}

fn main() {
    assert_eq!(Permissions::READ.raw_value(), 1);
    assert_eq!(Permissions::all().raw_value(), 0b111);
}
