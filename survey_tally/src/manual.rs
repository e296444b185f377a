/*!

This is the long-form manual for `survey_tally` and `surveyrpt`.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values, as exported by Google Forms
* `xlsx` Excel workbooks, as exported by Google Forms and Microsoft Forms

In both cases the first row is the header and every other row is one response.

### `csv`

The header row and the cells are trimmed.
Quoted cells may contain line breaks: they are kept as part of the cell.

Rows that cannot be read, or that do not have the same number of cells as the
header, are skipped. They are reported as `skipped_rows` in the output.

### `xlsx`

The worksheet is chosen with `excelWorksheetName` (or `--excel-worksheet-name`).
By default, the first worksheet of the workbook is used.

Numbers are read as text (`4.0` becomes `4`), dates are read as
`YYYY-MM-DD HH:MM:SS`.

## Columns

Columns are found by looking for a piece of text in the header. The first
header containing the text is used.

| Answer                    | Default header text                                           | Required |
|---------------------------|---------------------------------------------------------------|----------|
| `country`                 | `What country are you based in`                               | yes      |
| `communicationPreference` | `What is your preferred way to receive updates`               | yes      |
| `circleRating`            | `How would you rate you experience of Circle`                 | yes      |
| `circleFeedback`          | `Please share your reasoning behind your rating for Circle`   | yes      |
| `communityGoals`          | `What are the top 1-3 things you hope to gain`                | yes      |
| `eventTypes`              | `To help us plan, what types of events`                       | yes      |
| `contentPreferences`      | `What kind of content / articles / resources`                 | yes      |
| `interestGroups`          | `If we were to create interest-based groups`                  | yes      |
| `contributionInterests`   | `How would you be interested in contributing`                 | yes      |
| `involvement`             | `Would you like us to inform you with specific ways`          | yes      |
| `suggestions`             | `Do you have any other comments, questions or suggestion`     | yes      |
| `valueRatingPrefix`       | `How valuable do you find the following aspects`              | no       |
| `email`                   | `email` (any case)                                            | no       |
| `timestamp`               | `timestamp` (any case)                                        | no       |

A missing required column stops the processing, and the error lists the headers that
were found. The optional columns are skipped when they are not found.

Every column starting with `valueRatingPrefix` is one aspect of the value grid. The
aspect is the text between the brackets:
`How valuable do you find the following aspects of the ALX community? [Networking opportunities with other members]`
is the aspect `Networking opportunities with other members`.

## Processing

* Countries are normalized: cities map to their country (`Lagos` is `Nigeria`),
  common spellings and abbreviations are recognized (`RSA`, `Naija` with an alias),
  small typos are corrected (`Keniya` is `Kenya`). Answers that are not a place
  (emails, `N/A`, ...) are counted as `Unknown`. Blank answers are not counted.
* Other categorical answers are compared without case and extra spaces. The
  label is the most frequent spelling.
* Free text answers are split on line breaks. Every piece is one response, and
  gets a theme (the first matching group of keywords, `Other` otherwise) and a
  sentiment (`positive`, `negative` or `neutral`).
* When `deduplicateByEmail` is on and both the email and the timestamp columns are
  present, only the latest response of every email is kept (the timestamp decides,
  then the order in the file). Without one of these columns all the responses are kept.

## Configuration

The configuration is a JSON file. All the keys are optional. Paths are relative
to the directory of the configuration file.

```text
{
  "inputFile": "community_survey.csv",
  "inputType": "csv",
  "excelWorksheetName": "Form Responses 1",
  "outputJson": "survey_data.json",
  "outputJs": "survey_data.js",
  "jsVariableName": "surveyData",
  "columns": {
    "country": "Which country"
  },
  "topCountries": 10,
  "countryAliases": {
    "naija": "Nigeria"
  },
  "affirmativeAnswer": "Yes",
  "deduplicateByEmail": true,
  "freeTextDelimiters": "\n"
}
```

Command line flags override the file: `--input`, `--input-type`, `--out`, `--js-out`,
`--js-variable`, `--excel-worksheet-name`.

## Output

The output is a JSON document with the keys sorted:

```text
{
  "categorized_responses": {
    "circle_feedback": {
      "Performance Issues": [
        {"category": "Performance Issues", "sentiment": "negative", "text": "Too slow"}
      ],
      ...
    },
    ...
  },
  "circle_ratings": {"4.0": 1, "5.0": 2},
  "communication_preferences": {"Email": 3},
  "contribution_preferences": {"Mentoring": 1},
  "countries": {"Kenya": 2},
  "event_preferences": {"Local Meetups": 2},
  "source": {"file": "community_survey.csv", "sha256": "..."},
  "stats": {
    "avg_circle_rating": 4.7,
    "contribution_percentage": 67,
    "countries_count": 1,
    "skipped_ratings": 0,
    "skipped_rows": 0,
    "total_responses": 3
  },
  "value_ratings": {
    "Networking opportunities with other members": {"Very valuable": 2}
  }
}
```

The JavaScript output contains the same document, assigned to a constant:
`const surveyData = {...};`.

Deviations from the spreadsheet tooling this replaces:
- the output is deterministic. Identical inputs give byte-identical outputs.
- accents and other diacritics are folded before countries are recognized
  (`Côte d'Ivoire`, `Mālī`).
- ratings that are not numbers are counted in `skipped_ratings` instead of stopping
  the processing.

*/
