// MIT/Apache2 License

//! Document structuring for print jobs.
//!
//! A print operation drives a context through a fixed sequence of events: the header comments and prolog,
//! document setup, then each page, then the trailer. Each event is written through the context's raw
//! client output as Adobe Document Structuring Conventions comments, so any streaming backend can be
//! printed to.

use crate::{GraphicsContext, Rect};

/// The order pages are emitted in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PageOrder {
    Ascending,
    Descending,
    Special,
    /// The order is not known, and no `%%PageOrder` comment is written.
    Unknown,
}

impl Default for PageOrder {
    #[inline]
    fn default() -> Self {
        PageOrder::Ascending
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Default for Orientation {
    #[inline]
    fn default() -> Self {
        Orientation::Portrait
    }
}

/// What the surrounding print operation tells the context about the job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintJob {
    /// Whether this is an Encapsulated PostScript job rather than a full document.
    pub eps: bool,
    pub page_order: PageOrder,
    pub orientation: Orientation,
    /// Prolog resource written by [`GraphicsContext::printer_prolog`].
    pub prolog: Vec<u8>,
}

impl PrintJob {
    /// A full-document job with default settings.
    #[inline]
    pub fn document() -> Self {
        Self::default()
    }

    /// An EPS job.
    #[inline]
    pub fn eps() -> Self {
        Self {
            eps: true,
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_page_order(mut self, order: PageOrder) -> Self {
        self.page_order = order;
        self
    }

    #[inline]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[inline]
    pub fn with_prolog(mut self, prolog: impl Into<Vec<u8>>) -> Self {
        self.prolog = prolog.into();
        self
    }
}

/// Header information for [`GraphicsContext::begin_prologue`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentInfo<'a> {
    /// An empty box defers the bounding box to the trailer.
    pub bbox: Rect<f32>,
    pub creation_date: &'a str,
    pub creator: &'a str,
    /// Space-separated font names, or `None` to defer them to the trailer.
    pub fonts: Option<&'a str>,
    pub for_whom: &'a str,
    /// Zero defers the page count to the trailer.
    pub pages: u32,
    pub title: &'a str,
}

/// A bounding box in DSC form: integral, with the upper corner rounded.
struct BoundingBox(Rect<f32>);

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = &self.0;
        write!(
            f,
            "{} {} {} {}",
            r.min_x() as i32,
            r.min_y() as i32,
            (r.max_x() + 0.5) as i32,
            (r.max_y() + 0.5) as i32
        )
    }
}

impl GraphicsContext {
    /// Write the document's header comments.
    pub fn begin_prologue(&self, job: &PrintJob, info: &DocumentInfo<'_>) -> crate::Result {
        log::debug!("Beginning prologue for print job {:?}", info.title);

        if job.eps {
            self.write_formatted(format_args!("%!PS-Adobe-3.0 EPSF-3.0\n"))?;
        } else {
            self.write_formatted(format_args!("%!PS-Adobe-3.0\n"))?;
        }
        self.write_formatted(format_args!("%%Title: {}\n", info.title))?;
        self.write_formatted(format_args!("%%Creator: {}\n", info.creator))?;
        self.write_formatted(format_args!("%%CreationDate: {}\n", info.creation_date))?;
        self.write_formatted(format_args!("%%For: {}\n", info.for_whom))?;

        match info.fonts {
            Some(fonts) => self.write_formatted(format_args!("%%DocumentFonts: {}\n", fonts))?,
            None => self.write_formatted(format_args!("%%DocumentFonts: (atend)\n"))?,
        }

        if info.bbox.is_empty() {
            self.write_formatted(format_args!("%%BoundingBox: (atend)\n"))?;
        } else {
            self.write_formatted(format_args!("%%BoundingBox: {}\n", BoundingBox(info.bbox)))?;
        }

        if job.eps {
            return Ok(());
        }

        if info.pages == 0 {
            self.write_formatted(format_args!("%%Pages: (atend)\n"))?;
        } else {
            self.write_formatted(format_args!("%%Pages: {}\n", info.pages))?;
        }

        let order = match job.page_order {
            PageOrder::Descending => Some("Descend"),
            PageOrder::Ascending => Some("Ascend"),
            PageOrder::Special => Some("Special"),
            PageOrder::Unknown => None,
        };
        if let Some(order) = order {
            self.write_formatted(format_args!("%%PageOrder: {}\n", order))?;
        }

        match job.orientation {
            Orientation::Portrait => self.write_formatted(format_args!("%%Orientation: Portrait\n")),
            Orientation::Landscape => {
                self.write_formatted(format_args!("%%Orientation: Landscape\n"))
            }
        }
    }

    /// Write the job's prolog resource.
    ///
    /// A job without a prolog writes nothing; that is logged, as the document will likely not render.
    pub fn printer_prolog(&self, job: &PrintJob) -> crate::Result {
        if job.prolog.is_empty() {
            log::warn!("Print job has no printer prolog");
            return Ok(());
        }

        self.write_data(&job.prolog)?;
        self.write_formatted(format_args!("\n\n"))
    }

    #[inline]
    pub fn end_header_comments(&self) -> crate::Result {
        self.write_formatted(format_args!("%%EndComments\n\n"))
    }

    #[inline]
    pub fn end_prologue(&self) -> crate::Result {
        self.write_formatted(format_args!("%%EndProlog\n\n"))
    }

    #[inline]
    pub fn begin_setup(&self) -> crate::Result {
        self.write_formatted(format_args!("%%BeginSetup\n"))
    }

    #[inline]
    pub fn end_setup(&self) -> crate::Result {
        self.write_formatted(format_args!("%%EndSetup\n\n"))
    }

    /// Start a page. Without a label the ordinal is used as the label.
    pub fn begin_page(
        &self,
        ordinal: u32,
        label: Option<&str>,
        bbox: Rect<f32>,
        fonts: Option<&str>,
    ) -> crate::Result {
        log::trace!("Beginning page {}", ordinal);

        match label {
            Some(label) => self.write_formatted(format_args!("%%Page: {} {}\n", label, ordinal))?,
            None => self.write_formatted(format_args!("%%Page: {} {}\n", ordinal, ordinal))?,
        }
        if !bbox.is_empty() {
            self.write_formatted(format_args!("%%PageBoundingBox: {}\n", BoundingBox(bbox)))?;
        }
        if let Some(fonts) = fonts {
            self.write_formatted(format_args!("%%PageFonts: {}\n", fonts))?;
        }
        self.write_formatted(format_args!("%%BeginPageSetup\n"))
    }

    #[inline]
    pub fn end_page_setup(&self) -> crate::Result {
        self.write_formatted(format_args!("%%EndPageSetup\n"))
    }

    /// Emit the page and close it.
    pub fn end_sheet(&self) -> crate::Result {
        self.show_page()?;
        self.write_formatted(format_args!("%%PageTrailer\n\n"))
    }

    #[inline]
    pub fn begin_trailer(&self) -> crate::Result {
        self.write_formatted(format_args!("%%Trailer\n"))
    }

    /// Write the values deferred with `(atend)` in the header.
    ///
    /// Nothing is written for a zero page count or an empty font list.
    pub fn end_document_pages<S: AsRef<str>>(&self, pages: u32, fonts: &[S]) -> crate::Result {
        if pages != 0 {
            self.write_formatted(format_args!("%%Pages: {}\n", pages))?;
        }

        let mut fonts = fonts.iter();
        if let Some(first) = fonts.next() {
            self.write_formatted(format_args!("%%DocumentFonts: {}\n", first.as_ref()))?;
            for font in fonts {
                self.write_formatted(format_args!("%%+ {}\n", font.as_ref()))?;
            }
        }
        Ok(())
    }

    #[inline]
    pub fn end_trailer(&self) -> crate::Result {
        self.write_formatted(format_args!("%%EOF\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{written, Recorder},
        Attributes, Font,
    };
    use lyon_geom::{point, size};

    fn info(bbox: Rect<f32>) -> DocumentInfo<'static> {
        DocumentInfo {
            bbox,
            creation_date: "Oct 19, 2026 10:00AM",
            creator: "easel",
            fonts: None,
            for_whom: "tester",
            pages: 0,
            title: "Untitled",
        }
    }

    #[test]
    fn document_prologue() {
        let _ = env_logger::builder().is_test(true).try_init();

        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        let job = PrintJob::document()
            .with_page_order(PageOrder::Descending)
            .with_orientation(Orientation::Landscape);
        let bbox = Rect::new(point(0.0, 0.0), size(611.6, 791.5));

        ctx.begin_prologue(&job, &info(bbox)).unwrap();
        ctx.end_header_comments().unwrap();

        assert_eq!(
            written(&log),
            "%!PS-Adobe-3.0\n\
             %%Title: Untitled\n\
             %%Creator: easel\n\
             %%CreationDate: Oct 19, 2026 10:00AM\n\
             %%For: tester\n\
             %%DocumentFonts: (atend)\n\
             %%BoundingBox: 0 0 612 792\n\
             %%Pages: (atend)\n\
             %%PageOrder: Descend\n\
             %%Orientation: Landscape\n\
             %%EndComments\n\n"
        );
    }

    #[test]
    fn eps_prologue_stops_after_bounding_box() {
        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        let mut info = info(Rect::zero());
        info.fonts = Some("Helvetica Courier");
        info.pages = 4;

        ctx.begin_prologue(&PrintJob::eps(), &info).unwrap();

        let out = written(&log);
        assert!(out.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n"));
        assert!(out.contains("%%DocumentFonts: Helvetica Courier\n"));
        assert!(out.ends_with("%%BoundingBox: (atend)\n"));
        assert!(!out.contains("%%Pages"));
        assert!(!out.contains("%%Orientation"));
    }

    #[test]
    fn page_sequence() {
        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();

        ctx.begin_page(2, None, Rect::new(point(10.0, 20.0), size(100.0, 50.0)), Some("Times-Roman"))
            .unwrap();
        ctx.end_page_setup().unwrap();
        ctx.end_sheet().unwrap();
        ctx.begin_page(3, Some("iii"), Rect::zero(), None).unwrap();

        assert_eq!(
            written(&log),
            "%%Page: 2 2\n\
             %%PageBoundingBox: 10 20 110 70\n\
             %%PageFonts: Times-Roman\n\
             %%BeginPageSetup\n\
             %%EndPageSetup\n\
             <showpage>%%PageTrailer\n\n\
             %%Page: iii 3\n\
             %%BeginPageSetup\n"
        );
    }

    #[test]
    fn trailer_lists_used_fonts() {
        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        ctx.set_font(&Font::new("Times-Roman", 12.0)).unwrap();
        ctx.set_font(&Font::new("Courier", 10.0)).unwrap();
        ctx.record_font_use("Helvetica");

        ctx.begin_trailer().unwrap();
        ctx.end_document_pages(3, &ctx.used_fonts()).unwrap();
        ctx.end_trailer().unwrap();

        assert_eq!(
            written(&log),
            "%%Trailer\n\
             %%Pages: 3\n\
             %%DocumentFonts: Courier\n\
             %%+ Helvetica\n\
             %%+ Times-Roman\n\
             %%EOF\n"
        );
    }

    #[test]
    fn empty_trailer_values_are_skipped() {
        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();
        ctx.end_document_pages::<&str>(0, &[]).unwrap();
        assert_eq!(written(&log), "");
    }

    #[test]
    fn prolog_and_setup() {
        let (recorder, log) = Recorder::new();
        let ctx = GraphicsContext::from_backend(recorder, Attributes::new()).unwrap();

        ctx.printer_prolog(&PrintJob::document()).unwrap();
        ctx.printer_prolog(&PrintJob::document().with_prolog(&b"/easel 1 def"[..]))
            .unwrap();
        ctx.end_prologue().unwrap();
        ctx.begin_setup().unwrap();
        ctx.end_setup().unwrap();

        assert_eq!(
            written(&log),
            "/easel 1 def\n\n%%EndProlog\n\n%%BeginSetup\n%%EndSetup\n\n"
        );
    }
}
