//! Tool catalog for the Indian Stock Exchange API
//!
//! Static registry of the callable operations: their wire descriptors
//! (name, description, inputSchema), the upstream endpoint each one
//! forwards to, the query parameters it passes through, and the heading
//! used when formatting results for display. Loaded once at process
//! start; pure data, no behavior beyond lookup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Wire-visible tool descriptor.
///
/// Serialized with exactly the fields `name`, `description` and
/// `inputSchema`; some clients reject descriptors carrying unknown
/// metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for the tool arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// One query parameter forwarded to the upstream endpoint.
#[derive(Debug, Clone, Copy)]
pub struct QueryParam {
    /// Argument name, also used as the upstream query key
    pub name: &'static str,
    /// Optional parameters are forwarded only when present
    pub required: bool,
}

impl QueryParam {
    const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// Heading placed above the pretty-printed upstream payload in a tool
/// result.
#[derive(Debug, Clone, Copy)]
pub enum Heading {
    /// Fixed label, no argument interpolation
    Plain(&'static str),
    /// `"{label} for {argument}"`
    KeyedBy {
        label: &'static str,
        argument: &'static str,
    },
    /// `"{label} for '{argument}'"`; search-style tools quote the term
    QuotedKeyedBy {
        label: &'static str,
        argument: &'static str,
    },
    /// `"{label} ({qualifier}) for {argument}"`
    Qualified {
        label: &'static str,
        qualifier: &'static str,
        argument: &'static str,
    },
}

impl Heading {
    /// Render the heading against the call arguments.
    pub fn render(&self, arguments: &Map<String, Value>) -> String {
        let arg = |key: &str| {
            arguments
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        match self {
            Heading::Plain(label) => (*label).to_string(),
            Heading::KeyedBy { label, argument } => {
                format!("{label} for {}", arg(argument))
            }
            Heading::QuotedKeyedBy { label, argument } => {
                format!("{label} for '{}'", arg(argument))
            }
            Heading::Qualified {
                label,
                qualifier,
                argument,
            } => format!("{label} ({}) for {}", arg(qualifier), arg(argument)),
        }
    }
}

/// Complete specification of one tool: wire descriptor plus the
/// forwarding rules the dispatcher needs to invoke it.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Wire-visible descriptor
    pub descriptor: ToolDescriptor,
    /// Upstream endpoint path
    pub endpoint: &'static str,
    /// Query parameters forwarded from the call arguments
    pub query: Vec<QueryParam>,
    /// Result heading
    pub heading: Heading,
}

impl ToolSpec {
    fn new(
        name: &str,
        description: &str,
        input_schema: Value,
        endpoint: &'static str,
        query: Vec<QueryParam>,
        heading: Heading,
    ) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: name.to_string(),
                description: description.to_string(),
                input_schema,
            },
            endpoint,
            query,
            heading,
        }
    }
}

/// Static registry of callable tools, keyed by name, iteration order
/// matching registration order.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: IndexMap<String, ToolSpec>,
}

impl ToolCatalog {
    /// Build the catalog of Indian Stock Exchange tools.
    pub fn new() -> Self {
        let mut tools = IndexMap::new();
        for spec in builtin_tools() {
            tools.insert(spec.descriptor.name.clone(), spec);
        }
        Self { tools }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name)
    }

    /// Wire descriptors in registration order.
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().map(|spec| &spec.descriptor).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn string_arg_schema(name: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            name: {
                "type": "string",
                "description": description
            }
        },
        "required": [name]
    })
}

fn no_arg_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": []
    })
}

fn builtin_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            "get_stock_data",
            "Get detailed financial data for a specific company by name",
            string_arg_schema("name", "Company name, shortened name, or search term"),
            "/stock",
            vec![QueryParam::required("name")],
            Heading::KeyedBy {
                label: "Stock Data",
                argument: "name",
            },
        ),
        ToolSpec::new(
            "search_industry",
            "Search for companies within a specific industry",
            string_arg_schema("query", "Industry search term"),
            "/industry_search",
            vec![QueryParam::required("query")],
            Heading::QuotedKeyedBy {
                label: "Industry Search Results",
                argument: "query",
            },
        ),
        ToolSpec::new(
            "search_mutual_funds",
            "Search for mutual funds",
            string_arg_schema("query", "Mutual fund search term"),
            "/mutual_fund_search",
            vec![QueryParam::required("query")],
            Heading::QuotedKeyedBy {
                label: "Mutual Fund Search Results",
                argument: "query",
            },
        ),
        ToolSpec::new(
            "get_trending_stocks",
            "Get trending stocks with top gainers and losers",
            no_arg_schema(),
            "/trending",
            Vec::new(),
            Heading::Plain("Trending Stocks"),
        ),
        ToolSpec::new(
            "get_52_week_high_low",
            "Get stocks with highest and lowest prices in the last 52 weeks",
            no_arg_schema(),
            "/fetch_52_week_high_low_data",
            Vec::new(),
            Heading::Plain("52 Week High/Low Data"),
        ),
        ToolSpec::new(
            "get_nse_most_active",
            "Get most active stocks on NSE by trading volume",
            no_arg_schema(),
            "/NSE_most_active",
            Vec::new(),
            Heading::Plain("NSE Most Active Stocks"),
        ),
        ToolSpec::new(
            "get_bse_most_active",
            "Get most active stocks on BSE by trading volume",
            no_arg_schema(),
            "/BSE_most_active",
            Vec::new(),
            Heading::Plain("BSE Most Active Stocks"),
        ),
        ToolSpec::new(
            "get_mutual_funds",
            "Get latest mutual fund data with NAV and returns",
            no_arg_schema(),
            "/mutual_funds",
            Vec::new(),
            Heading::Plain("Mutual Funds Data"),
        ),
        ToolSpec::new(
            "get_price_shockers",
            "Get stocks with significant price changes",
            no_arg_schema(),
            "/price_shockers",
            Vec::new(),
            Heading::Plain("Price Shockers"),
        ),
        ToolSpec::new(
            "get_commodities",
            "Get real-time commodity futures data",
            no_arg_schema(),
            "/commodities",
            Vec::new(),
            Heading::Plain("Commodity Futures Data"),
        ),
        ToolSpec::new(
            "get_analyst_recommendations",
            "Get analyst target prices and recommendations for a stock",
            string_arg_schema("stock_id", "Stock identifier"),
            "/stock_target_price",
            vec![QueryParam::required("stock_id")],
            Heading::KeyedBy {
                label: "Analyst Recommendations",
                argument: "stock_id",
            },
        ),
        ToolSpec::new(
            "get_stock_forecasts",
            "Get detailed forecast information for a stock",
            json!({
                "type": "object",
                "properties": {
                    "stock_id": {
                        "type": "string",
                        "description": "Stock identifier"
                    },
                    "measure_code": {
                        "type": "string",
                        "enum": ["EPS", "CPS", "CPX", "DPS", "EBI", "EBT", "GPS", "GRM",
                                 "NAV", "NDT", "NET", "PRE", "ROA", "ROE", "SAL"],
                        "description": "Measure code for forecast"
                    },
                    "period_type": {
                        "type": "string",
                        "enum": ["Annual", "Interim"],
                        "description": "Period type"
                    },
                    "data_type": {
                        "type": "string",
                        "enum": ["Actuals", "Estimates"],
                        "description": "Data type"
                    },
                    "age": {
                        "type": "string",
                        "enum": ["OneWeekAgo", "ThirtyDaysAgo", "SixtyDaysAgo",
                                 "NinetyDaysAgo", "Current"],
                        "description": "Data age"
                    }
                },
                "required": ["stock_id", "measure_code", "period_type", "data_type", "age"]
            }),
            "/stock_forecasts",
            vec![
                QueryParam::required("stock_id"),
                QueryParam::required("measure_code"),
                QueryParam::required("period_type"),
                QueryParam::required("data_type"),
                QueryParam::required("age"),
            ],
            Heading::KeyedBy {
                label: "Stock Forecasts",
                argument: "stock_id",
            },
        ),
        ToolSpec::new(
            "get_historical_data",
            "Get historical stock data with various filters",
            json!({
                "type": "object",
                "properties": {
                    "stock_name": {
                        "type": "string",
                        "description": "Stock symbol or name"
                    },
                    "period": {
                        "type": "string",
                        "enum": ["1m", "6m", "1yr", "3yr", "5yr", "10yr", "max"],
                        "description": "Time period",
                        "default": "5yr"
                    },
                    "filter": {
                        "type": "string",
                        "enum": ["default", "price", "pe", "sm", "evebitda", "ptb", "mcs"],
                        "description": "Data filter",
                        "default": "default"
                    }
                },
                "required": ["stock_name"]
            }),
            "/historical_data",
            vec![
                QueryParam::required("stock_name"),
                QueryParam::optional("period"),
                QueryParam::optional("filter"),
            ],
            Heading::KeyedBy {
                label: "Historical Data",
                argument: "stock_name",
            },
        ),
        ToolSpec::new(
            "get_historical_stats",
            "Get historical statistics for a stock",
            json!({
                "type": "object",
                "properties": {
                    "stock_name": {
                        "type": "string",
                        "description": "Stock symbol or name"
                    },
                    "stats": {
                        "type": "string",
                        "enum": ["quarter_results", "yoy_results", "balancesheet",
                                 "cashflow", "ratios", "shareholding_pattern_quarterly",
                                 "shareholding_pattern_yearly"],
                        "description": "Type of historical statistics"
                    }
                },
                "required": ["stock_name", "stats"]
            }),
            "/historical_stats",
            vec![
                QueryParam::required("stock_name"),
                QueryParam::required("stats"),
            ],
            Heading::Qualified {
                label: "Historical Stats",
                qualifier: "stats",
                argument: "stock_name",
            },
        ),
    ]
}
