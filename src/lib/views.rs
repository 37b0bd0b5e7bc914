//! Server-rendered HTML pages. Every stored or submitted value is escaped
//! before it is interpolated.

use crate::core::Movie;

const SEARCH_EXCERPT_CHARS: usize = 100;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn rating_text(movie: &Movie) -> String {
    movie.rating.map_or_else(|| "N/A".to_string(), |r| r.to_string())
}

fn year_text(movie: &Movie) -> String {
    movie.year.map_or_else(|| "N/A".to_string(), |y| y.to_string())
}

fn excerpt(description: &str) -> String {
    if description.is_empty() {
        return "No description".to_string();
    }
    let head: String = description.chars().take(SEARCH_EXCERPT_CHARS).collect();
    format!("{}...", escape_html(&head))
}

pub fn search_page(term: &str, results: &[Movie]) -> String {
    let mut html = format!("<h1>Search results for: {}</h1>", escape_html(term));
    for m in results {
        html.push_str(&format!(
            r#"<div style="border:1px solid #ccc;padding:15px;margin:10px;border-radius:5px;">
      <h3>{title} ({year})</h3>
      <p><strong>Director:</strong> {director}</p>
      <p><strong>Genre:</strong> {genre}</p>
      <p><strong>Rating:</strong> {rating}/10</p>
      <p>{excerpt}</p>
      <a href="/item/{id}">View details</a></div>"#,
            title = escape_html(&m.title),
            year = year_text(m),
            director = escape_html(&m.director),
            genre = escape_html(&m.genre.join(", ")),
            rating = rating_text(m),
            excerpt = excerpt(&m.description),
            id = escape_html(&m.id),
        ));
    }
    if results.is_empty() {
        html.push_str("<p>No movies found</p>");
    }
    html.push_str(r#"<br><a href="/">← Back to Home</a>"#);
    html
}

pub fn movie_page(movie: &Movie) -> String {
    let title = escape_html(&movie.title);
    let id = escape_html(&movie.id);
    let description = if movie.description.is_empty() {
        "No description available".to_string()
    } else {
        escape_html(&movie.description)
    };
    format!(
        r#"<html>
  <head>
    <title>{title}</title>
    <style>
      body {{ font-family: Arial; margin: 40px; }}
      .movie-card {{ max-width: 800px; margin: 0 auto; }}
      .api-link {{ color: #667eea; }}
    </style>
  </head>
  <body>
    <div class="movie-card">
      <h1>{title} ({year})</h1>
      <p><strong>Director:</strong> {director}</p>
      <p><strong>Genre:</strong> {genre}</p>
      <p><strong>Rating:</strong> {rating}/10</p>
      <p><strong>Age Rating:</strong> {age_rating}</p>
      <p>{description}</p>
      <a href="/">← Back to Home</a>
      <br><br>
      <a href="/api/movies/{id}" class="api-link" target="_blank">View JSON API data</a>
    </div>
  </body>
</html>
"#,
        year = year_text(movie),
        director = escape_html(&movie.director),
        genre = escape_html(&movie.genre.join(", ")),
        rating = rating_text(movie),
        age_rating = escape_html(movie.age_rating.as_deref().unwrap_or("N/A")),
    )
}

pub fn thank_you_page(name: &str) -> String {
    format!(r#"<h2>Thank you {}!</h2><a href="/">← Home</a>"#, escape_html(name))
}
