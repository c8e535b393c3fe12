use html_escape::{encode_double_quoted_attribute, encode_text};

use super::OutgoingEmail;

const TEXT_WIDTH: usize = 80;

fn render(to: &str, subject: &str, intro: &str, link: &str) -> OutgoingEmail {
    let html = format!(
        "<html>\n  <head></head>\n  <body>\n    <p>{intro}</p>\n    <p><a href=\"{href}\">{text}</a></p>\n  </body>\n</html>\n",
        intro = encode_text(intro),
        href = encode_double_quoted_attribute(link),
        text = encode_text(link),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: subject.to_string(),
        html,
    }
}

#[must_use]
pub fn verification(to: &str, link: &str) -> OutgoingEmail {
    render(
        to,
        "Verify your email",
        "Hello, please click on the link below to verify your email:",
        link,
    )
}

#[must_use]
pub fn password_reset(to: &str, link: &str) -> OutgoingEmail {
    render(
        to,
        "Reset your password",
        "Hello, please click on the link below to reset your password:",
        link,
    )
}

/// Text alternative for clients that do not render HTML.
#[must_use]
pub fn plain_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), TEXT_WIDTH).unwrap_or_else(|_| html.to_string())
}
