//! Helpers for building and picking apart mrkdwn strings.
//!
//! <https://api.slack.com/reference/surfaces/formatting>

use regex::Regex;
use url::Url;

/// Escape the three control characters. Anything else is literal.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn user_mention(user_id: &str) -> String {
    format!("<@{}>", user_id)
}

pub fn channel_mention(channel_id: &str) -> String {
    format!("<#{}>", channel_id)
}

/// Prettify a URL, reducing verbosity.
///
/// ```
/// use iris::block::mrkdwn::link;
/// use url::Url;
///
/// let url = "https://example.com/it?set_locale=it-IT";
/// assert_eq!(
///     link(&Url::parse(url).unwrap()),
///     format!("<{}|example.com/it>", url)
/// );
/// ```
pub fn link(u: &Url) -> String {
    let href = u.to_string();

    // Formats most links to a prettier format, falling back to the href.
    if let Some(host) = u.host_str() {
        let host_sans_www = host.trim_start_matches("www.");

        let path = u.path();
        let path_or_empty = if path == "/" { "" } else { path };
        format!("<{}|{}{}>", href, host_sans_www, path_or_empty)
    } else {
        href
    }
}

/// Extract the IDs of users mentioned in a message or command text, in order
/// of appearance. Both `<@U123>` and the labelled `<@U123|name>` forms are
/// recognised.
pub fn user_mentions(text: &str) -> Vec<String> {
    Regex::new(r"<@(?P<id>[UW][A-Z0-9]+)(?:\|[^>]*)?>")
        .map(|re| {
            re.captures_iter(text)
                .filter_map(|cs| cs.name("id"))
                .map(|m| m.as_str().to_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_mentions() {
        assert_eq!(user_mention("U1"), "<@U1>");
        assert_eq!(channel_mention("C1"), "<#C1>");

        assert_eq!(
            user_mentions("ping <@U123ABC> and <@W99|jo>, not <#C1> or <@lower>"),
            vec!["U123ABC".to_owned(), "W99".to_owned()]
        );
        assert!(user_mentions("nobody").is_empty());
    }

    #[test]
    fn test_link() {
        let pretty_raw = "https://images.example.com/path/to/photo.jpg?size=large";
        let pretty = Url::parse(pretty_raw).unwrap();
        assert_eq!(
            link(&pretty),
            format!("<{}|images.example.com/path/to/photo.jpg>", pretty_raw)
        );

        let pretty_www_raw = "https://www.example.com/path/to/photo.jpg?size=large";
        let pretty_www = Url::parse(pretty_www_raw).unwrap();
        assert_eq!(
            link(&pretty_www),
            format!("<{}|example.com/path/to/photo.jpg>", pretty_www_raw)
        );

        let pretty_no_path_raw = "https://example.com/";
        let pretty_no_path = Url::parse(pretty_no_path_raw).unwrap();
        assert_eq!(
            link(&pretty_no_path),
            format!("<{}|example.com>", pretty_no_path_raw)
        );

        let ugly_raw = "data:text/plain,Hello?World#";
        let ugly = Url::parse(ugly_raw).unwrap();
        assert_eq!(link(&ugly), ugly_raw);
    }

    quickcheck! {
        fn test_escape_leaves_no_angle_brackets(x: String) -> bool {
            let escaped = escape(&x);
            !escaped.contains('<') && !escaped.contains('>')
        }

        fn test_user_mentions_never_panics(x: String) -> () {
            user_mentions(&x);
        }
    }
}
