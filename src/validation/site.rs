//! Validation for the site settings and lookbook singletons.

use super::{clean_opt, Validator};
use crate::errors::AppError;
use crate::models::{LookbookInput, SiteSettingsInput};

pub fn validate_site_settings(input: SiteSettingsInput) -> Result<SiteSettingsInput, AppError> {
    let mut v = Validator::new();
    v.email("contact.email", &input.contact.email)
        .phone("contact.phone", input.contact.phone.as_deref())
        .phone("contact.whatsapp", input.contact.whatsapp.as_deref())
        .max_len("contact.address", input.contact.address.as_deref(), "Address", 500)
        .url("social.instagram", input.social.instagram.as_deref())
        .url("social.facebook", input.social.facebook.as_deref())
        .url("social.pinterest", input.social.pinterest.as_deref())
        .text("seo.defaultTitle", &input.seo.default_title, "Default title", 2, 70)
        .max_len(
            "seo.defaultDescription",
            Some(input.seo.default_description.as_str()),
            "Default description",
            160,
        )
        .url("seo.ogImage", input.seo.og_image.as_deref())
        .url("calendlyUrl", input.calendly_url.as_deref());
    v.finish()?;

    let mut settings = input;
    settings.contact.email = settings.contact.email.trim().to_lowercase();
    settings.contact.phone = clean_opt(settings.contact.phone);
    settings.contact.whatsapp = clean_opt(settings.contact.whatsapp);
    settings.contact.address = clean_opt(settings.contact.address);
    settings.social.instagram = clean_opt(settings.social.instagram);
    settings.social.facebook = clean_opt(settings.social.facebook);
    settings.social.pinterest = clean_opt(settings.social.pinterest);
    settings.seo.default_title = settings.seo.default_title.trim().to_string();
    settings.seo.default_description = settings.seo.default_description.trim().to_string();
    settings.seo.og_image = clean_opt(settings.seo.og_image);
    settings.calendly_url = clean_opt(settings.calendly_url);
    Ok(settings)
}

pub fn validate_lookbook(input: LookbookInput) -> Result<LookbookInput, AppError> {
    let mut v = Validator::new();
    v.text("title", &input.title, "Title", 2, 120)
        .max_len("description", input.description.as_deref(), "Description", 1000)
        .url("fileUrl", input.file_url.as_deref())
        .url("coverImage", input.cover_image.as_deref())
        .max_len("fileName", input.file_name.as_deref(), "File name", 200)
        .check(
            "fileName",
            input.file_name.is_none() || input.file_url.is_some(),
            "A file name needs a file URL",
        );
    v.finish()?;

    Ok(LookbookInput {
        title: input.title.trim().to_string(),
        description: clean_opt(input.description),
        file_url: clean_opt(input.file_url),
        file_name: clean_opt(input.file_name),
        cover_image: clean_opt(input.cover_image),
    })
}
