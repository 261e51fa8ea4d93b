use sqlx::query_builder::Separated;
use sqlx::sqlite::SqliteRow;
use sqlx::{Encode, FromRow, Sqlite, Type};

use crate::db::models::{Credential, FaqItem, GalleryPhoto, Service, Specialty, Testimonial};
use crate::types::Content;

pub type Binds<'qb, 'args> = Separated<'qb, 'args, Sqlite, &'static str>;

/// Table mapping for a sortable entity.
///
/// `INSERT_COLUMNS` and `bind_insert` must list the same columns in the same
/// order; `"order"` is left out of both and appended by the storage layer.
pub trait ContentTable: Content + for<'r> FromRow<'r, SqliteRow> {
    const TABLE: &'static str;
    /// Select list, also used for `RETURNING`.
    const COLUMNS: &'static str;
    const INSERT_COLUMNS: &'static str;

    fn bind_insert<'args>(values: &mut Binds<'_, 'args>, new: &Self::New);

    /// Explicit position requested on create; `None` appends.
    fn requested_order(new: &Self::New) -> Option<i64>;

    /// Push `column = ?` for every field present in the patch; returns how many.
    fn bind_patch<'args>(set: &mut Binds<'_, 'args>, patch: &Self::Patch) -> usize;

    /// File under the image store owned by this row, removed with it.
    fn stored_image(&self) -> Option<&str> {
        None
    }
}

fn assign<'args, V>(set: &mut Binds<'_, 'args>, column: &str, value: Option<V>) -> usize
where
    V: 'args + Encode<'args, Sqlite> + Type<Sqlite>,
{
    match value {
        Some(v) => {
            set.push(format!("{column} = ")).push_bind_unseparated(v);
            1
        }
        None => 0,
    }
}

/// Empty strings clear nullable text columns.
fn nullable(value: &Option<String>) -> Option<Option<String>> {
    value
        .as_ref()
        .map(|v| Some(v.trim()).filter(|v| !v.is_empty()).map(str::to_string))
}

/// Required text is stored trimmed, as on insert.
fn text(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|v| v.trim().to_string())
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ContentTable for Testimonial {
    const TABLE: &'static str = "testimonials";
    const COLUMNS: &'static str =
        r#"id, name, service, testimonial, rating, photo, is_active, "order""#;
    const INSERT_COLUMNS: &'static str = "name, service, testimonial, rating, photo, is_active";

    fn bind_insert<'args>(values: &mut Binds<'_, 'args>, new: &Self::New) {
        values
            .push_bind(new.name.trim().to_string())
            .push_bind(new.service.trim().to_string())
            .push_bind(new.testimonial.trim().to_string())
            .push_bind(new.rating)
            .push_bind(trimmed(&new.photo))
            .push_bind(new.is_active);
    }

    fn requested_order(new: &Self::New) -> Option<i64> {
        new.order
    }

    fn bind_patch<'args>(set: &mut Binds<'_, 'args>, patch: &Self::Patch) -> usize {
        assign(set, "name", text(&patch.name))
            + assign(set, "service", text(&patch.service))
            + assign(set, "testimonial", text(&patch.testimonial))
            + assign(set, "rating", patch.rating)
            + assign(set, "photo", nullable(&patch.photo))
            + assign(set, "is_active", patch.is_active)
            + assign(set, r#""order""#, patch.order)
    }

    fn stored_image(&self) -> Option<&str> {
        self.photo.as_deref()
    }
}

impl ContentTable for FaqItem {
    const TABLE: &'static str = "faq_items";
    const COLUMNS: &'static str = r#"id, question, answer, is_active, "order""#;
    const INSERT_COLUMNS: &'static str = "question, answer, is_active";

    fn bind_insert<'args>(values: &mut Binds<'_, 'args>, new: &Self::New) {
        values
            .push_bind(new.question.trim().to_string())
            .push_bind(new.answer.trim().to_string())
            .push_bind(new.is_active);
    }

    fn requested_order(new: &Self::New) -> Option<i64> {
        new.order
    }

    fn bind_patch<'args>(set: &mut Binds<'_, 'args>, patch: &Self::Patch) -> usize {
        assign(set, "question", text(&patch.question))
            + assign(set, "answer", text(&patch.answer))
            + assign(set, "is_active", patch.is_active)
            + assign(set, r#""order""#, patch.order)
    }
}

impl ContentTable for Service {
    const TABLE: &'static str = "services";
    const COLUMNS: &'static str =
        r#"id, title, description, icon, duration, price, is_active, "order""#;
    const INSERT_COLUMNS: &'static str = "title, description, icon, duration, price, is_active";

    fn bind_insert<'args>(values: &mut Binds<'_, 'args>, new: &Self::New) {
        values
            .push_bind(new.title.trim().to_string())
            .push_bind(new.description.trim().to_string())
            .push_bind(trimmed(&new.icon))
            .push_bind(trimmed(&new.duration))
            .push_bind(trimmed(&new.price))
            .push_bind(new.is_active);
    }

    fn requested_order(new: &Self::New) -> Option<i64> {
        new.order
    }

    fn bind_patch<'args>(set: &mut Binds<'_, 'args>, patch: &Self::Patch) -> usize {
        assign(set, "title", text(&patch.title))
            + assign(set, "description", text(&patch.description))
            + assign(set, "icon", nullable(&patch.icon))
            + assign(set, "duration", nullable(&patch.duration))
            + assign(set, "price", nullable(&patch.price))
            + assign(set, "is_active", patch.is_active)
            + assign(set, r#""order""#, patch.order)
    }
}

impl ContentTable for Specialty {
    const TABLE: &'static str = "specialties";
    const COLUMNS: &'static str = r#"id, title, description, icon, color, is_active, "order""#;
    const INSERT_COLUMNS: &'static str = "title, description, icon, color, is_active";

    fn bind_insert<'args>(values: &mut Binds<'_, 'args>, new: &Self::New) {
        values
            .push_bind(new.title.trim().to_string())
            .push_bind(new.description.trim().to_string())
            .push_bind(trimmed(&new.icon))
            .push_bind(trimmed(&new.color))
            .push_bind(new.is_active);
    }

    fn requested_order(new: &Self::New) -> Option<i64> {
        new.order
    }

    fn bind_patch<'args>(set: &mut Binds<'_, 'args>, patch: &Self::Patch) -> usize {
        assign(set, "title", text(&patch.title))
            + assign(set, "description", text(&patch.description))
            + assign(set, "icon", nullable(&patch.icon))
            + assign(set, "color", nullable(&patch.color))
            + assign(set, "is_active", patch.is_active)
            + assign(set, r#""order""#, patch.order)
    }
}

impl ContentTable for GalleryPhoto {
    const TABLE: &'static str = "gallery_photos";
    const COLUMNS: &'static str = r#"id, title, description, image_url, is_active, "order""#;
    const INSERT_COLUMNS: &'static str = "title, description, image_url, is_active";

    fn bind_insert<'args>(values: &mut Binds<'_, 'args>, new: &Self::New) {
        values
            .push_bind(new.title.trim().to_string())
            .push_bind(trimmed(&new.description))
            .push_bind(new.image_url.trim().to_string())
            .push_bind(new.is_active);
    }

    fn requested_order(new: &Self::New) -> Option<i64> {
        new.order
    }

    fn bind_patch<'args>(set: &mut Binds<'_, 'args>, patch: &Self::Patch) -> usize {
        assign(set, "title", text(&patch.title))
            + assign(set, "description", nullable(&patch.description))
            + assign(set, "image_url", text(&patch.image_url))
            + assign(set, "is_active", patch.is_active)
            + assign(set, r#""order""#, patch.order)
    }

    fn stored_image(&self) -> Option<&str> {
        Some(self.image_url.as_str())
    }
}

impl ContentTable for Credential {
    const TABLE: &'static str = "credentials";
    const COLUMNS: &'static str = r#"id, title, institution, year, is_active, "order""#;
    const INSERT_COLUMNS: &'static str = "title, institution, year, is_active";

    fn bind_insert<'args>(values: &mut Binds<'_, 'args>, new: &Self::New) {
        values
            .push_bind(new.title.trim().to_string())
            .push_bind(new.institution.trim().to_string())
            .push_bind(trimmed(&new.year))
            .push_bind(new.is_active);
    }

    fn requested_order(new: &Self::New) -> Option<i64> {
        new.order
    }

    fn bind_patch<'args>(set: &mut Binds<'_, 'args>, patch: &Self::Patch) -> usize {
        assign(set, "title", text(&patch.title))
            + assign(set, "institution", text(&patch.institution))
            + assign(set, "year", nullable(&patch.year))
            + assign(set, "is_active", patch.is_active)
            + assign(set, r#""order""#, patch.order)
    }
}
