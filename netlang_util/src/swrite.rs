use std::fmt::Display;

pub trait StringMut {
    fn as_mut_string(&mut self) -> &mut String;
}

impl StringMut for String {
    fn as_mut_string(&mut self) -> &mut String {
        self
    }
}

impl<T: StringMut> StringMut for &mut T {
    fn as_mut_string(&mut self) -> &mut String {
        (*self).as_mut_string()
    }
}

/// Variant of write! that only works for strings, and doesn't return a spurious error.
#[macro_export]
macro_rules! swrite {
    ($dst:expr, $($arg:tt)*) => {{
        use std::fmt::Write;
        use $crate::swrite::StringMut;
        let dst = $dst.as_mut_string();
        write!(dst, $($arg)*).unwrap();
    }};
}

/// Append all items to `dst`, separated by `sep`.
pub fn swrite_separated<T: Display>(mut dst: impl StringMut, sep: &str, items: impl IntoIterator<Item = T>) {
    for (i, item) in items.into_iter().enumerate() {
        if i != 0 {
            swrite!(dst, "{sep}");
        }
        swrite!(dst, "{item}");
    }
}

#[cfg(test)]
mod tests {
    use crate::swrite::swrite_separated;

    #[test]
    fn separated() {
        let mut s = String::from("(");
        swrite_separated(&mut s, ", ", ["bit", "bit[4]"]);
        s.push(')');
        assert_eq!(s, "(bit, bit[4])");

        let mut empty = String::new();
        swrite_separated(&mut empty, ", ", Vec::<String>::new());
        assert_eq!(empty, "");
    }
}
