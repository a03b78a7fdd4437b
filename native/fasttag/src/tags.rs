//! Tag Table and Named Constructors
//!
//! One static table of known element names with their void flag, and one
//! lower-case constructor per name (`div()`, `input()`, ...) returning an
//! empty `Element` ready for the builder methods.
//!
//! Unknown names are still renderable through `Element::new`; they are
//! simply never void.

use crate::render::Element;

/// A known element name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    pub name: &'static str,
    /// Void elements have no close tag and no children
    pub void: bool,
}

macro_rules! tag_table {
    (
        void { $($void:ident),* $(,)? }
        normal { $($normal:ident),* $(,)? }
    ) => {
        /// Every known element, void elements first
        pub static TAGS: &[TagSpec] = &[
            $(TagSpec { name: stringify!($void), void: true },)*
            $(TagSpec { name: stringify!($normal), void: false },)*
        ];

        /// Whether `name` is an HTML void element
        #[inline]
        pub fn is_void(name: &str) -> bool {
            matches!(name, $(stringify!($void))|*)
        }

        $(
            #[doc = concat!("Empty `<", stringify!($void), ">` element (void)")]
            #[inline]
            pub fn $void<'a>() -> Element<'a> {
                Element::new(stringify!($void))
            }
        )*

        $(
            #[doc = concat!("Empty `<", stringify!($normal), ">` element")]
            #[inline]
            pub fn $normal<'a>() -> Element<'a> {
                Element::new(stringify!($normal))
            }
        )*
    };
}

tag_table! {
    void {
        area, base, basefont, bgsound, br, col, embed, frame, hr, img, input,
        keygen, link, meta, param, source, track, wbr,
    }
    normal {
        a, abbr, acronym, address, applet, article, aside, audio, b, bdi, bdo,
        big, blink, blockquote, body, button, canvas, caption, center, cite,
        code, colgroup, content, data, datalist, dd, del, details, dfn, dialog,
        dir, div, dl, dt, element, em, fieldset, figcaption, figure, font,
        footer, form, frameset, h1, h2, h3, h4, h5, h6, head, header, hgroup,
        html, i, iframe, image, ins, isindex, kbd, label, legend, li, listing,
        main, map, mark, marquee, math, menu, menuitem, meter, multicol, nav,
        nextid, nobr, noembed, noframes, noscript, object, ol, optgroup,
        option, output, p, picture, plaintext, pre, progress, q, rp, rt, ruby,
        s, samp, script, search, section, select, shadow, slot, small, spacer,
        span, strike, strong, style, sub, summary, sup, svg, table, tbody, td,
        template, textarea, tfoot, th, thead, time, title, tr, tt, u, ul, var,
        video, xmp,
    }
}

/// Find the table entry for a name (exact, lower-case match)
pub fn lookup(name: &str) -> Option<&'static TagSpec> {
    TAGS.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::context::RenderContext;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("br", true)]
    #[case("input", true)]
    #[case("wbr", true)]
    #[case("keygen", true)]
    #[case("div", false)]
    #[case("pre", false)]
    #[case("custom-element", false)]
    #[case("BR", false)]
    fn test_is_void(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_void(name), expected);
    }

    #[test]
    fn test_table_agrees_with_is_void() {
        for spec in TAGS {
            assert_eq!(is_void(spec.name), spec.void, "{}", spec.name);
        }
        assert_eq!(TAGS.iter().filter(|s| s.void).count(), 18);
    }

    #[test]
    fn test_table_names_unique() {
        let names: HashSet<&str> = TAGS.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), TAGS.len());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("img"), Some(&TagSpec { name: "img", void: true }));
        assert_eq!(lookup("section").map(|s| s.void), Some(false));
        assert_eq!(lookup("nope"), None);
    }

    #[test]
    fn test_constructors_render() {
        let ctx = RenderContext::compact();
        assert_eq!(div().render_with(&ctx).unwrap().as_str(), "<div></div>");
        assert_eq!(hr().render_with(&ctx).unwrap().as_str(), "<hr>");
        assert_eq!(h1().child("x").render_with(&ctx).unwrap().as_str(), "<h1>x</h1>");
        assert!(meta().is_void());
        assert!(!span().is_void());
    }
}
