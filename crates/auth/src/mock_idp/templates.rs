//! HTML templates for the mock IdP login page.

/// Escape HTML special characters to prevent XSS.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Generate the login page for `provider`.
///
/// The form posts the profile fields back to `/authorize/submit`, which turns
/// them into a mock authorization code.
pub fn login_page(provider: &str, state: &str, redirect_uri: &str) -> String {
    let provider = html_escape(provider);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Mock {provider} Sign In (DEV ONLY)</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, sans-serif;
            max-width: 400px;
            margin: 100px auto;
            padding: 20px;
        }}
        .warning {{
            background: #fff3cd;
            border: 1px solid #ffc107;
            padding: 15px;
            border-radius: 8px;
            margin-bottom: 20px;
        }}
        form {{
            background: #f8f9fa;
            padding: 20px;
            border-radius: 8px;
        }}
        label {{
            display: block;
            margin-bottom: 5px;
            font-weight: 500;
        }}
        input[type="email"], input[type="text"] {{
            width: 100%;
            padding: 10px;
            margin-bottom: 15px;
            border: 1px solid #ced4da;
            border-radius: 4px;
            box-sizing: border-box;
        }}
        button {{
            width: 100%;
            padding: 12px;
            margin-bottom: 8px;
            border: none;
            border-radius: 4px;
            cursor: pointer;
            font-size: 16px;
        }}
        button[value="allow"] {{ background: #007bff; color: white; }}
        button[value="deny"] {{ background: #e9ecef; }}
    </style>
</head>
<body>
    <div class="warning">
        <p>This is a <strong>mock {provider} login</strong> for development.</p>
        <p>The subject defaults to the email address.</p>
    </div>

    <form action="/authorize/submit" method="POST">
        <input type="hidden" name="state" value="{state}" />
        <input type="hidden" name="redirect_uri" value="{redirect_uri}" />

        <label for="email">Email Address</label>
        <input type="email" id="email" name="email" placeholder="dev@example.com" required />

        <label for="sub">Subject (optional)</label>
        <input type="text" id="sub" name="sub" />

        <label for="first_name">First name</label>
        <input type="text" id="first_name" name="first_name" />

        <label for="last_name">Last name</label>
        <input type="text" id="last_name" name="last_name" />

        <label for="nickname">Nickname</label>
        <input type="text" id="nickname" name="nickname" placeholder="dev" />

        <button type="submit" name="action" value="allow">Sign in with {provider}</button>
        <button type="submit" name="action" value="deny">Cancel</button>
    </form>
</body>
</html>"#,
        state = html_escape(state),
        redirect_uri = html_escape(redirect_uri),
    )
}
