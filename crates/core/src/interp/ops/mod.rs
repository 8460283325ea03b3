//! Content stream operator implementations.
//!
//! Operators are grouped by category, each file adding `do_*` methods to
//! `PDFPageInterpreter`:
//! - `graphics_state` - q, Q, cm, w, d, gs
//! - `color` - G, g, RG, rg, K, k, CS, cs, SC, SCN, sc, scn
//! - `path` - m, l, c, v, y, h, re, S, s, f, F, f\*, B, B\*, b, b\*, n
//! - `text` - BT, TL, Tf, Td, TD, Tm, T\*, Tj, TJ, ', "
//! - `xobject` - Do and inline images

mod color;
mod graphics_state;
mod path;
mod text;
mod xobject;
