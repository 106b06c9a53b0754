use super::super::App;
use gloo_file::File as GlooFile;
use web_sys::FileList;
use yew::prelude::*;

pub const ACCEPTED_TYPES: &str = ".jpg,.jpeg,.png,image/jpeg,image/png";

/// Accepts JPEG and PNG by MIME type, falling back to the file extension when
/// the browser reports no type.
pub fn is_supported_image(mime_type: &str, file_name: &str) -> bool {
    match mime_type {
        "image/jpeg" | "image/png" => true,
        "" => {
            let name = file_name.to_ascii_lowercase();
            [".jpg", ".jpeg", ".png"].iter().any(|ext| name.ends_with(ext))
        }
        _ => false,
    }
}

pub fn first_image_file(file_list: &FileList) -> Option<GlooFile> {
    (0..file_list.length())
        .filter_map(|i| file_list.item(i))
        .find(|file| is_supported_image(&file.type_(), &file.name()))
        .map(GlooFile::from)
}

pub fn render_error_message(app: &App) -> Html {
    if let Some(error_msg) = &app.error {
        html! {
            <div class="error-message">
                <p>{ format!("❌ {}", error_msg) }</p>
            </div>
        }
    } else {
        html! {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_jpeg_and_png_only() {
        assert!(is_supported_image("image/jpeg", "scan.jpg"));
        assert!(is_supported_image("image/png", "scan"));
        assert!(!is_supported_image("image/gif", "scan.gif"));
        assert!(!is_supported_image("application/pdf", "scan.png"));
    }

    #[test]
    fn falls_back_to_extension_without_mime() {
        assert!(is_supported_image("", "CHEST.JPEG"));
        assert!(!is_supported_image("", "notes.txt"));
    }
}
